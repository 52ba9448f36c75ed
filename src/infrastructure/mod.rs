// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod earth_engine;
pub mod expression_encoder;
pub mod token_source;
