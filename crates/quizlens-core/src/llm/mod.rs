//! Remote model integration.
//!
//! Provides the client abstraction the relay depends on, the Gemini REST
//! implementation, and candidate model selection (fixed or catalog-driven).

pub(crate) mod candidates;
pub(crate) mod gemini;
pub(crate) mod provider;

pub use candidates::{order_candidates, CandidateSelector, CandidateSource};
pub use gemini::GeminiClient;
pub use provider::{
    CatalogModel, ImageInput, LlmRequest, LlmResponse, ModelClient, ANALYSIS_PROMPT,
};
