//! Configuration management for the transformer.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. All config structs implement `Default` with the values the
//! o11y workshop services listen on out of the box.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Image inventory settings
    pub source: SourceConfig,

    /// Request generation and target settings
    pub generate: GenerateConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.o11y-workshop.transformer/config.toml
    /// - Linux: ~/.config/transformer/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\o11y-workshop\transformer\config\config.toml
    ///
    /// Falls back to ~/.transformer/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "o11y-workshop", "transformer")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".transformer").join("config.toml")
            })
    }

    /// Resolved target output path (with ~ expansion), or `None` for stdout.
    pub fn output_path(&self) -> Option<PathBuf> {
        self.generate.output.as_deref().map(|path| {
            let expanded = shellexpand::tilde(path);
            PathBuf::from(expanded.into_owned())
        })
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
