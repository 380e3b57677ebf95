//! Config file persistence.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use super::app_config::{AppConfig, project_dirs};

const CONFIG_FILE_NAME: &str = "config.toml";

/// Failures reading or writing the config file.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ConfigError {
    #[error("failed to determine config directory")]
    ConfigDirNotFound,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("toml serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

/// Reads and writes one `config.toml`.
#[derive(Debug, Clone)]
pub struct StorageManager {
    config_path: PathBuf,
}

impl StorageManager {
    /// Uses `path_override`, or `config.toml` in the per-user config directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if no override is given and the config directory cannot be determined.
    pub fn new(path_override: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path_override {
            Some(path) => path.to_path_buf(),
            None => project_dirs()
                .ok_or(ConfigError::ConfigDirNotFound)?
                .config_dir()
                .join(CONFIG_FILE_NAME),
        };
        Ok(Self { config_path })
    }

    /// Path of the managed file.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Loads the application configuration.
    ///
    /// A missing file is created with defaults; an unparsable one is left
    /// untouched and defaults are used.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or created.
    pub fn load_config(&self) -> Result<AppConfig, ConfigError> {
        match self.read() {
            Ok(Some(config)) => Ok(config),
            Ok(None) => {
                info!(path = %self.config_path.display(), "Config file not found, creating default");
                let config = AppConfig::default();
                self.save_config(&config)?;
                Ok(config)
            }
            Err(ConfigError::Parse(e)) => {
                warn!(path = %self.config_path.display(), error = %e, "Failed to parse config file, using defaults");
                Ok(AppConfig::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Writes `config`, replacing the file atomically.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be written.
    pub fn save_config(&self, config: &AppConfig) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(config)?;

        let parent = self
            .config_path
            .parent()
            .ok_or_else(|| std::io::Error::other("config path has no parent directory"))?;
        fs::create_dir_all(parent)?;
        let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
        temp_file.write_all(content.as_bytes())?;
        temp_file.persist(&self.config_path).map_err(|e| e.error)?;

        Ok(())
    }

    /// Stores `api_key` in the file, keeping every other setting in it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` rather than overwriting a file that does not parse,
    /// or an I/O error if writing fails.
    pub fn store_api_key(&self, api_key: &str) -> Result<(), ConfigError> {
        let mut config = self.read()?.unwrap_or_default();
        config.api.api_key = Some(api_key.to_string());
        self.save_config(&config)
    }

    fn read(&self) -> Result<Option<AppConfig>, ConfigError> {
        if !self.config_path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.config_path)?;
        Ok(Some(toml::from_str(&content)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn manager(dir: &Path) -> StorageManager {
        StorageManager::new(Some(&dir.join("nested").join(CONFIG_FILE_NAME))).unwrap()
    }

    #[test]
    fn test_load_config_creates_default_if_missing() {
        let dir = tempdir().unwrap();
        let manager = manager(dir.path());

        let config = manager.load_config().unwrap();

        assert_eq!(config.images.cache_capacity, 20);
        assert!(manager.config_path().exists());
    }

    #[test]
    fn test_load_config_handles_malformed_file() {
        let dir = tempdir().unwrap();
        let manager = StorageManager::new(Some(&dir.path().join(CONFIG_FILE_NAME))).unwrap();
        fs::write(manager.config_path(), "log_level = [").unwrap();

        let config = manager.load_config().unwrap();

        assert_eq!(config.search.debounce_ms, 500);
        let content = fs::read_to_string(manager.config_path()).unwrap();
        assert_eq!(content, "log_level = [");
    }

    #[test]
    fn test_store_api_key_keeps_other_settings() {
        let dir = tempdir().unwrap();
        let manager = manager(dir.path());
        let mut config = AppConfig::default();
        config.images.poster_tier = 4;
        config.search.debounce_ms = 250;
        manager.save_config(&config).unwrap();

        manager.store_api_key("k").unwrap();

        let loaded = manager.load_config().unwrap();
        assert_eq!(loaded.api.api_key.as_deref(), Some("k"));
        assert_eq!(loaded.images.poster_tier, 4);
        assert_eq!(loaded.search.debounce_ms, 250);
    }

    #[test]
    fn test_store_api_key_creates_missing_file() {
        let dir = tempdir().unwrap();
        let manager = manager(dir.path());

        manager.store_api_key("k").unwrap();

        let content = fs::read_to_string(manager.config_path()).unwrap();
        assert!(content.contains("api_key = \"k\""));
    }

    #[test]
    fn test_store_api_key_refuses_malformed_file() {
        let dir = tempdir().unwrap();
        let manager = StorageManager::new(Some(&dir.path().join(CONFIG_FILE_NAME))).unwrap();
        fs::write(manager.config_path(), "log_level = [").unwrap();

        let result = manager.store_api_key("k");

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        let content = fs::read_to_string(manager.config_path()).unwrap();
        assert_eq!(content, "log_level = [");
    }
}
