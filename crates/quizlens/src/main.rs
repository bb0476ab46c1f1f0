//! QuizLens - turn a photo of study notes into a summary and a quiz.
//!
//! QuizLens is a thin HTTP relay: clients upload an image, the server sends
//! it to a hosted Gemini model with a tutoring prompt and returns the
//! model's `{summary, quiz}` answer as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Start the HTTP server
//! quizlens serve --port 8000
//!
//! # Analyze a single image from the command line
//! quizlens analyze notes.jpg --pretty
//!
//! # Show which models would be tried, in order
//! quizlens models
//!
//! # View configuration
//! quizlens config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;
mod server;

/// QuizLens - turn a photo of study notes into a summary and a quiz.
#[derive(Parser, Debug)]
#[command(name = "quizlens")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Path to a config file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "QUIZLENS_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(cli::serve::ServeArgs),

    /// Analyze one image and print the JSON result
    Analyze(cli::analyze::AnalyzeArgs),

    /// List the candidate models in the order they would be tried
    Models,

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing .env file is normal outside local development
    dotenvy::dotenv().ok();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = cli::load_config(cli.config.as_deref())?;
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("QuizLens v{}", quizlens_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Analyze(args) => cli::analyze::execute(args, config).await,
        Commands::Models => cli::models::execute(config).await,
        Commands::Config(args) => cli::config::execute(args, cli.config.as_deref()).await,
    }
}
