// Chiyoda imagery analyses on top of the Earth Engine REST API
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
