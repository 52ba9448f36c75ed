// Application layer - Use cases and the remote service seam
pub mod imagery_service;
pub mod map_service;
pub mod query_builder;
pub mod series_service;
pub mod session;
