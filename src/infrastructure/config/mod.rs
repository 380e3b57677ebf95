//! Application configuration.

/// Settings read from the config file.
pub mod app_config;
/// Command-line flags.
pub mod args;
/// Config file persistence.
pub mod storage;

pub use app_config::{ApiConfig, AppConfig, ImagesConfig, LogLevel, SearchConfig};
pub use args::CliArgs;
pub use storage::{ConfigError, StorageManager};
