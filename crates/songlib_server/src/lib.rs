//! Process wiring for the song catalog server: configuration and HTTP hosting.

pub mod config;
pub mod http;

pub use config::{load_env_file, ConfigError, ServerConfig};
pub use http::{into_http_response, router, SharedApi};
