//! The `quizlens analyze` command: one image, no server.

use clap::Args;
use quizlens_core::{Analyzer, Config};
use std::path::PathBuf;

/// Arguments for the `analyze` command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Image file to analyze
    pub image: PathBuf,

    /// Pretty-print the JSON result
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the analyze command.
pub async fn execute(args: AnalyzeArgs, config: Config) -> anyhow::Result<()> {
    if !args.image.exists() {
        anyhow::bail!(
            "Image does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            args.image
        );
    }

    let analyzer = Analyzer::from_config(&config)?;
    let result = analyzer.analyze_file(&args.image).await?;
    let output = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{output}");
    Ok(())
}
