//! QuizLens Core - relay study-material photos to a hosted vision model.
//!
//! An uploaded image is decoded, sent with a fixed tutoring prompt to the
//! first Gemini model that answers, and the reply is cleaned up and parsed
//! into a `{summary, quiz}` JSON object.
//!
//! # Architecture
//!
//! ```text
//! Upload → Decode → Candidate models → Generate (first success) → Sanitize → JSON
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use quizlens_core::{Analyzer, Config};
//!
//! #[tokio::main]
//! async fn main() -> quizlens_core::Result<()> {
//!     let config = Config::load()?;
//!     let analyzer = Analyzer::from_config(&config)?;
//!
//!     let bytes = std::fs::read("./notes.jpg")?;
//!     let result = analyzer.analyze(bytes).await?;
//!     println!("{}", result["summary"]);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod relay;
pub mod sanitize;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenient access
pub use config::Config;
pub use error::{AnalyzeError, ConfigError, ModelError, QuizLensError, Result};
pub use llm::{CandidateSource, GeminiClient, ModelClient};
pub use relay::{AnalyzeOptions, Analyzer};
pub use types::{AnalysisResult, QuizQuestion};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
