// Presentation layer - Rendered artifacts and entry points
pub mod commands;
pub mod map_page;
pub mod series_chart;
pub mod viewer;
