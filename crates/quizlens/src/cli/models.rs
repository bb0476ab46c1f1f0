//! The `quizlens models` command.

use quizlens_core::{Analyzer, CandidateSource, Config};

/// Print the candidate models in the order a request would try them.
pub async fn execute(config: Config) -> anyhow::Result<()> {
    let analyzer = Analyzer::from_config(&config)?;
    let (candidates, source) = analyzer.candidates().await?;

    let origin = match source {
        CandidateSource::Fixed => "fixed model",
        CandidateSource::Catalog | CandidateSource::CachedCatalog => "model catalog",
        CandidateSource::Fallback => "fallback list (catalog unavailable)",
    };
    println!("Candidates from {origin}:");
    for (i, name) in candidates.iter().enumerate() {
        println!("  {:>2}. {name}", i + 1);
    }
    if candidates.is_empty() {
        println!("  (none: every model is blocked by gemini.blocked_markers)");
    }
    Ok(())
}
