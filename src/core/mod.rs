mod config;
pub use config::{AppConfig, SearchConfig};
