//! Application configuration.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use super::args::CliArgs;
use crate::domain::entities::DEFAULT_POSTER_TIER;
use crate::infrastructure::image::{DEFAULT_CACHE_SIZE, ImageLoaderConfig};
use crate::infrastructure::tmdb::TMDB_API_BASE;

const APP_NAME: &str = "movie-browser";
const APP_QUALIFIER: &str = "org";
const APP_ORGANIZATION: &str = "moviebrowser";

/// Per-user directories for the config file and the log.
pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
}

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, read from `config.toml` and overridden by CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Catalog API access.
    #[serde(default)]
    pub api: ApiConfig,

    /// Poster loading.
    #[serde(default)]
    pub images: ImagesConfig,

    /// Search input handling.
    #[serde(default)]
    pub search: SearchConfig,
}

/// Catalog API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API root, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key sent with every catalog request.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Poster loading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// Posters kept in memory; 0 keeps everything until memory pressure.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Index into the catalog's poster size list.
    #[serde(default = "default_poster_tier")]
    pub poster_tier: usize,

    /// Share one download between concurrent requests for the same poster.
    #[serde(default = "default_true")]
    pub coalesce_requests: bool,

    /// Download timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ImagesConfig {
    /// Per-download timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Settings for the poster loader.
    #[must_use]
    pub const fn loader_config(&self) -> ImageLoaderConfig {
        ImageLoaderConfig {
            cache_capacity: self.cache_capacity,
            coalesce_requests: self.coalesce_requests,
        }
    }
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
            poster_tier: default_poster_tier(),
            coalesce_requests: true,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Search input configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period before typed input starts a search.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl SearchConfig {
    /// Quiet period as a duration.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_base_url() -> String {
    TMDB_API_BASE.to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_SIZE
}

const fn default_poster_tier() -> usize {
    DEFAULT_POSTER_TIER
}

const fn default_true() -> bool {
    true
}

const fn default_debounce_ms() -> u64 {
    500
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: CliArgs) {
        if let Some(config_path) = args.config {
            self.config = Some(config_path);
        }
        if let Some(log_path) = args.log_path {
            self.log_path = Some(log_path);
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(api_key) = args.api_key {
            self.api.api_key = Some(api_key);
        }
        if let Some(base_url) = args.api_base_url {
            self.api.base_url = base_url;
        }
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.data_dir().join("movie-browser.log"))
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            log_level: LogLevel::Info,
            api: ApiConfig::default(),
            images: ImagesConfig::default(),
            search: SearchConfig::default(),
        }
    }
}
