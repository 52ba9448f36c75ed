// Domain layer - Core models, no I/O
pub mod expression;
pub mod geometry;
pub mod map_view;
pub mod query;
pub mod study_area;
pub mod time_series;
