//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// Poster caching and loading.
pub mod image;
/// The Movie Database client.
pub mod tmdb;

pub use config::{AppConfig, CliArgs, ConfigError, LogLevel, StorageManager};
pub use self::image::{CacheStats, ImageCache, ImageLoader, ImageLoaderConfig};
pub use tmdb::TmdbClient;
