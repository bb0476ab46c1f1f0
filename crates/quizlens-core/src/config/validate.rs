//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::{Config, DiscoveryMode};

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_upload_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_upload_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.llm_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.llm_timeout_ms must be > 0".into(),
            ));
        }
        if self.gemini.endpoint.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "gemini.endpoint must not be empty".into(),
            ));
        }
        if self.gemini.discovery_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "gemini.discovery_timeout_ms must be > 0".into(),
            ));
        }
        match self.gemini.discovery {
            DiscoveryMode::Fixed if self.gemini.model.trim().is_empty() => {
                return Err(ConfigError::ValidationError(
                    "gemini.model must be set when discovery = \"fixed\"".into(),
                ));
            }
            DiscoveryMode::Auto if self.gemini.fallback_models.is_empty() => {
                return Err(ConfigError::ValidationError(
                    "gemini.fallback_models must not be empty when discovery = \"auto\"".into(),
                ));
            }
            _ => {}
        }
        if !(0.0..=2.0).contains(&self.gemini.temperature) {
            return Err(ConfigError::ValidationError(
                "gemini.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        Ok(())
    }
}
