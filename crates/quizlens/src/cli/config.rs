//! `quizlens config`: inspect or create the configuration file.

use clap::{Args, Subcommand};
use quizlens_core::config::expand_path;
use quizlens_core::Config;
use std::path::{Path, PathBuf};

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration (file, defaults and PORT), key redacted
    Show,

    /// Print which config file is in effect
    Path,

    /// Write a default config file
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

pub async fn execute(args: ConfigArgs, explicit_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path(explicit_path);
    let output = match args.command {
        ConfigCommand::Show => redacted(super::load_config(explicit_path)?).to_toml()?,
        ConfigCommand::Path => path.display().to_string(),
        ConfigCommand::Init { force } => {
            write_default(&path, force)?;
            tracing::info!(path = %path.display(), "Wrote default config");
            format!("Configuration initialized at: {}", path.display())
        }
    };
    println!("{output}");
    Ok(())
}

/// `--config` when given, otherwise the platform default.
fn config_path(explicit_path: Option<&str>) -> PathBuf {
    explicit_path
        .map(expand_path)
        .unwrap_or_else(Config::default_path)
}

/// Hide a literal API key. `${VAR}` references carry no secret and stay visible.
fn redacted(mut config: Config) -> Config {
    let key = &config.gemini.api_key;
    if !key.is_empty() && !key.starts_with("${") {
        config.gemini.api_key = "<redacted>".to_string();
    }
    config
}

fn write_default(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, Config::default().to_toml()?)?;
    Ok(())
}
