//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.fetch_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "source.fetch_url must not be empty".into(),
            ));
        }
        if self.source.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "source.timeout_ms must be > 0".into(),
            ));
        }
        if self.generate.transform_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "generate.transform_url must not be empty".into(),
            ));
        }
        if self.generate.count == 0 {
            return Err(ConfigError::ValidationError(
                "generate.count must be > 0".into(),
            ));
        }
        let factor = self.generate.max_resize_factor;
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ConfigError::ValidationError(
                "generate.max_resize_factor must be a finite number > 0".into(),
            ));
        }
        Ok(())
    }
}
