//! Command handlers.

pub mod analyze;
pub mod config;
pub mod models;
pub mod serve;

use quizlens_core::config::expand_path;
use quizlens_core::Config;

/// Load configuration from `--config` or the default location.
///
/// An explicit path must load cleanly. A broken default file only warns and
/// falls back to defaults (plus environment overrides), since the user may
/// not know it exists.
pub fn load_config(path: Option<&str>) -> anyhow::Result<Config> {
    if let Some(path) = path {
        let path = expand_path(path);
        return Config::load_from(&path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()));
    }

    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `quizlens config path`."
            );
            let mut config = Config::default();
            config.apply_env_overrides(|key| std::env::var(key).ok());
            Ok(config)
        }
    }
}
