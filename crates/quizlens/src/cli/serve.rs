//! The `quizlens serve` command.

use clap::Args;
use quizlens_core::{Analyzer, Config};

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Interface to bind (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides server.port and PORT)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Execute the serve command.
///
/// Under the strict credential policy a missing API key stops here, before
/// anything is bound.
pub async fn execute(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let analyzer = Analyzer::from_config(&config)?;
    if analyzer.is_configured() {
        tracing::info!(model = %analyzer.model_label(), "Gemini client initialized");
    }

    crate::server::run(config, analyzer).await
}
