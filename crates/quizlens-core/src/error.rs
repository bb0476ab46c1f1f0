//! Error types for the QuizLens relay.
//!
//! Errors are split by where they arise: configuration and startup, a
//! single remote model call, and a whole analysis request. Only
//! [`AnalyzeError`] ever reaches an HTTP client; [`ModelError`] is logged
//! and folded into [`AnalyzeError::AllCandidatesFailed`].

use thiserror::Error;

/// Top-level error type for QuizLens operations.
#[derive(Error, Debug)]
pub enum QuizLensError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Analysis request errors
    #[error("Analysis error: {0}")]
    Analyze(#[from] AnalyzeError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// The remote service credential is absent
    #[error("Gemini API key not configured: {0}")]
    MissingCredential(String),
}

/// Failure of a single call to the remote model service.
#[derive(Error, Debug, Clone)]
pub enum ModelError {
    /// Transport failure or non-success HTTP status
    #[error("{message}")]
    Request {
        message: String,
        status_code: Option<u16>,
    },

    /// The call did not finish within the per-candidate budget
    #[error("Model {model} timed out after {timeout_ms}ms")]
    Timeout { model: String, timeout_ms: u64 },

    /// The model answered but produced no text
    #[error("Model {model} returned an empty response")]
    EmptyResponse { model: String },
}

impl ModelError {
    /// HTTP status reported by the remote service, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ModelError::Request { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

/// Errors that end a single analysis request.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// Lenient startup without a credential
    #[error("Server not configured: {0}")]
    NotConfigured(String),

    /// Upload is not a decodable raster image
    #[error("Could not decode image: {0}")]
    Decode(String),

    /// Decoded image exceeds the dimension limit
    #[error("Image too large: {width}x{height} > {max_dim}")]
    ImageTooLarge { width: u32, height: u32, max_dim: u32 },

    /// Decoding took longer than the configured budget
    #[error("Image decoding timed out after {timeout_ms}ms")]
    DecodeTimeout { timeout_ms: u64 },

    /// Every candidate model failed
    #[error("All models failed ({attempted} tried). Last error: {last_error}")]
    AllCandidatesFailed { attempted: usize, last_error: String },

    /// The winning model's text is not valid JSON
    #[error("Model response is not valid JSON: {0}")]
    ResponseParse(String),

    /// The JSON parsed but does not match the quiz contract
    #[error("Model response does not match the quiz format: {0}")]
    InvalidQuiz(String),
}

/// Convenience type alias for QuizLens results.
pub type Result<T> = std::result::Result<T, QuizLensError>;
