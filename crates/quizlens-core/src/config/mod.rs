//! Configuration management for QuizLens.
//!
//! Configuration is loaded from a TOML file with sensible defaults, then
//! a small set of environment variables is layered on top (`PORT`, and the
//! API key through `${GEMINI_API_KEY}` references).

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for QuizLens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings
    pub server: ServerConfig,

    /// Gemini service settings
    pub gemini: GeminiConfig,

    /// Credential policy
    pub credentials: CredentialsConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Output checks
    pub validation: ValidationConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            Self::read_file(&path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Layer environment variables over file values.
    ///
    /// Takes a lookup function so tests don't have to touch the process
    /// environment. An unparsable `PORT` is ignored with a warning.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            match port.trim().parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid PORT value '{port}'"),
            }
        }
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.quizlens.quizlens/config.toml
    /// - Linux: ~/.config/quizlens/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\quizlens\config\config.toml
    ///
    /// Falls back to ~/.quizlens/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "quizlens", "quizlens")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".quizlens").join("config.toml")
            })
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

impl GeminiConfig {
    /// The API key after `${ENV_VAR}` resolution, if any.
    pub fn resolved_api_key(&self) -> Option<String> {
        resolve_env_var(&self.api_key).filter(|key| !key.trim().is_empty())
    }
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok()
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.gemini.discovery, DiscoveryMode::Auto);
        assert_eq!(config.credentials.policy, CredentialPolicy::Strict);
        assert_eq!(config.gemini.blocked_markers, vec!["2.0", "exp"]);
        assert!(!config.validation.strict_quiz);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[server]"));
        assert!(toml.contains("[gemini]"));
        assert!(toml.contains("discovery = \"auto\""));
    }

    #[test]
    fn test_load_from_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[gemini]\ndiscovery = \"fixed\"\nmodel = \"gemini-1.5-flash\"\n\n\
             [credentials]\npolicy = \"lenient\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.gemini.discovery, DiscoveryMode::Fixed);
        assert_eq!(config.gemini.model, "gemini-1.5-flash");
        assert_eq!(config.credentials.policy, CredentialPolicy::Lenient);
        // Untouched sections keep defaults
        assert_eq!(config.limits.max_upload_mb, 20);
    }

    #[test]
    fn test_load_from_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[gemini\nmodel = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_port_override() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| (key == "PORT").then(|| "8080".to_string()));
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_invalid_port_override_ignored() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| (key == "PORT").then(|| "eighty".to_string()));
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_resolve_env_var() {
        // Non-env-var strings pass through
        assert_eq!(resolve_env_var("plain-key"), Some("plain-key".to_string()));
        // Empty returns None
        assert_eq!(resolve_env_var(""), None);
        // Unset env var returns None
        assert_eq!(resolve_env_var("${DEFINITELY_NOT_SET_QL_123}"), None);
    }

    #[test]
    fn test_resolved_api_key_ignores_blank() {
        let gemini = GeminiConfig {
            api_key: "   ".to_string(),
            ..GeminiConfig::default()
        };
        assert_eq!(gemini.resolved_api_key(), None);

        let gemini = GeminiConfig {
            api_key: "literal-key".to_string(),
            ..GeminiConfig::default()
        };
        assert_eq!(gemini.resolved_api_key().as_deref(), Some("literal-key"));
    }

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path("~/quizlens.toml");
        assert!(!expanded.to_string_lossy().starts_with('~'));
    }
}
