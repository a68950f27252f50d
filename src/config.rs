//! Client configuration module
//!
//! This module loads and stores the client configuration as a TOML file in
//! the system's standard config directory. A missing file is not an error;
//! the defaults are used instead.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Name of the configuration file inside the config directory
const CONFIG_FILE: &str = "config.toml";

/// Errors that can occur while loading or storing the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to determine config directory location
    #[error("Failed to determine config directory location")]
    ConfigDirectoryNotFound,

    /// Failed to create the config directory
    #[error("Failed to create config directory at {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read the configuration file
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write the configuration file
    #[error("Failed to write config file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or has wrong types
    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Failed to serialize the configuration
    #[error("Failed to serialize config: {0}")]
    SerializationFailed(#[from] toml::ser::Error),
}

/// Settings of the tv2go client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the backend's REST API
    pub base_url: String,
    /// Timeout applied to every request, in seconds
    pub timeout_secs: u64,
    /// Indexer used when searching for new shows
    pub default_indexer: String,
    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9001/api/1".to_string(),
            timeout_secs: 30,
            default_indexer: "tvdb".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

impl ClientConfig {
    /// Loads the configuration from the standard location
    ///
    /// Returns the defaults if no configuration file exists yet.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path()?)
    }

    /// Loads the configuration from `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the TOML file
    ///
    /// # Returns
    ///
    /// The parsed configuration, the defaults if the file does not exist, or
    /// a ConfigError if it exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Stores the configuration at the standard location, returning its path
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Stores the configuration at `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| ConfigError::DirectoryCreationFailed {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }

        let content = self.to_toml()?;
        fs::write(path, content).map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Serializes the configuration as it would be written to disk
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Returns the path of the configuration file in the system's config directory
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = directories::ProjectDirs::from("org", "tv2go", "tv2go")
        .ok_or(ConfigError::ConfigDirectoryNotFound)?;
    Ok(proj_dirs.config_dir().join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = ClientConfig {
            base_url: "http://media-box:9001/api/1".to_string(),
            default_indexer: "tvrage".to_string(),
            ..ClientConfig::default()
        };

        config.save_to(&path).unwrap();

        assert_eq!(ClientConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "timeout_secs = 5\n").unwrap();

        let config = ClientConfig::load_from(&path).unwrap();

        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.base_url, ClientConfig::default().base_url);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "timeout_secs = \"soon\"\n").unwrap();

        let error = ClientConfig::load_from(&path).unwrap_err();
        assert!(matches!(error, ConfigError::ParseFailed { .. }));
    }
}
