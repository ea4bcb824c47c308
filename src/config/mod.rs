//! Configuration management for Extra Memory.
//!
//! This module handles loading, saving, and validating the user's
//! configuration: the backend location, the public share-link origin, and
//! application settings.

pub mod settings;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub use settings::Settings;

/// Default backend origin.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3000";

/// Default origin used when rewriting share links.
pub const DEFAULT_SHARE_BASE_URL: &str = "http://localhost:5173";

/// Default link metadata service.
pub const DEFAULT_LINK_PREVIEW_URL: &str = "https://api.microlink.io";

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine configuration directory")]
    NoConfigDir,

    /// The config directory could not be created.
    #[error("failed to create config directory: {0}")]
    CreateDirError(#[source] std::io::Error),

    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    ReadError(#[source] std::io::Error),

    /// The config file could not be written.
    #[error("failed to write config file: {0}")]
    WriteError(#[source] std::io::Error),

    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The config could not be serialized.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// A value failed validation.
    #[error("invalid configuration: {0}")]
    ValidationError(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The full application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Origin of the Extra Memory backend (the `/api/v1` prefix is implied).
    pub backend_url: String,
    /// Origin that share links are rewritten to.
    pub share_base_url: String,
    /// Microlink-compatible service used for link previews.
    pub link_preview_url: String,
    /// Application settings.
    pub settings: Settings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
            link_preview_url: DEFAULT_LINK_PREVIEW_URL.to_string(),
            settings: Settings::default(),
        }
    }
}

impl Config {
    /// Get the default config file path.
    ///
    /// - Linux: `~/.config/extramem/config.toml`
    /// - macOS: `~/Library/Application Support/extramem/config.toml`
    /// - Windows: `C:\Users\<User>\AppData\Roaming\extramem\config.toml`
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("extramem").join("config.toml"))
    }

    /// Load the config from the default path.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load the config from the given path.
    ///
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Save the config to the given path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::CreateDirError)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(ConfigError::WriteError)?;
        info!(path = %path.display(), "Saved config");
        Ok(())
    }

    /// Validate this config.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` if a URL is empty or not
    /// http(s), or a duration is zero.
    pub fn validate(&self) -> Result<()> {
        validate_url("backend_url", &self.backend_url)?;
        validate_url("share_base_url", &self.share_base_url)?;
        validate_url("link_preview_url", &self.link_preview_url)?;

        if self.settings.notification_duration_ms == 0 {
            return Err(ConfigError::ValidationError(
                "notification_duration_ms must be greater than zero".to_string(),
            ));
        }
        if self.settings.tick_rate_ms == 0 {
            return Err(ConfigError::ValidationError(
                "tick_rate_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Override the backend URL (from the command line).
    pub fn with_backend_url(mut self, url: impl Into<String>) -> Result<Self> {
        self.backend_url = url.into();
        self.validate()?;
        Ok(self)
    }
}

fn validate_url(field: &str, url: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "{} cannot be empty",
            field
        )));
    }
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(ConfigError::ValidationError(format!(
            "{} must start with http:// or https://",
            field
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.settings.notification_duration_ms, 2000);
        assert!(!config.settings.fallback_tags.is_empty());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.backend_url = "https://memory.example.com".to_string();
        config.settings.fallback_tags = vec!["rust".to_string()];
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "backend_url = \"https://api.example.com\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.backend_url, "https://api.example.com");
        assert_eq!(config.share_base_url, DEFAULT_SHARE_BASE_URL);
        assert_eq!(config.link_preview_url, DEFAULT_LINK_PREVIEW_URL);
        assert_eq!(config.settings, Settings::default());
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "backend_url = [").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let result = Config::default().with_backend_url("localhost:3000");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("must start with http"));
    }

    #[test]
    fn test_empty_url_rejected() {
        let mut config = Config::default();
        config.share_base_url = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("share_base_url cannot be empty"));

        let mut config = Config::default();
        config.link_preview_url = "api.microlink.io".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("link_preview_url must start with http"));
    }

    #[test]
    fn test_zero_durations_rejected() {
        let mut config = Config::default();
        config.settings.notification_duration_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.settings.tick_rate_ms = 0;
        assert!(config.validate().is_err());
    }
}
