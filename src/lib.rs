pub mod api;
pub mod arguments;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod logger;
pub mod stats;
