//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// Listen port (overridden by the PORT env var)
    pub port: u16,

    /// Mirror the request origin so browsers may send credentials
    pub cors_allow_credentials: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_allow_credentials: false,
        }
    }
}

/// How the list of candidate models is produced for each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryMode {
    /// Always use `gemini.model`
    Fixed,
    /// Query the model catalog and try each usable model in turn
    Auto,
}

/// Gemini service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// REST API base URL
    pub endpoint: String,

    /// Candidate discovery strategy
    pub discovery: DiscoveryMode,

    /// Model used in fixed mode
    pub model: String,

    /// Candidates used when the catalog cannot be listed
    pub fallback_models: Vec<String>,

    /// Model names containing any of these are never tried
    pub blocked_markers: Vec<String>,

    /// Model names containing this are tried first
    pub preferred_marker: String,

    /// How long a listed catalog is reused (0 = list on every request)
    pub catalog_ttl_secs: u64,

    /// Budget for listing the catalog in milliseconds; on expiry the fallback list is used
    pub discovery_timeout_ms: u64,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_output_tokens: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: "${GEMINI_API_KEY}".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            discovery: DiscoveryMode::Auto,
            model: "gemini-flash-latest".to_string(),
            fallback_models: vec![
                "gemini-flash-latest".to_string(),
                "gemini-1.5-flash-latest".to_string(),
                "gemini-pro-latest".to_string(),
            ],
            blocked_markers: vec!["2.0".to_string(), "exp".to_string()],
            preferred_marker: "flash".to_string(),
            catalog_ttl_secs: 300,
            discovery_timeout_ms: 5000,
            temperature: 0.2,
            max_output_tokens: 2048,
        }
    }
}

/// What happens when no API key can be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialPolicy {
    /// Refuse to start
    Strict,
    /// Start anyway; every analysis fails with "not configured"
    Lenient,
}

/// Credential handling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub policy: CredentialPolicy,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            policy: CredentialPolicy::Strict,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum upload body size in megabytes
    pub max_upload_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Timeout for a single model candidate in milliseconds
    pub llm_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_mb: 20,
            max_image_dimension: 12000,
            decode_timeout_ms: 5000,
            llm_timeout_ms: 60000,
        }
    }
}

/// Checks applied to the parsed model output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Reject payloads that are not 3 questions x 4 options with a listed answer.
    /// Off by default: the payload is relayed as the model produced it.
    pub strict_quiz: bool,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
