//! Remote model client trait and request/response types.
//!
//! Defines the interface the relay talks to. The production implementation
//! is [`GeminiClient`](super::gemini::GeminiClient); tests substitute
//! scripted clients.

use crate::error::ModelError;
use async_trait::async_trait;
use base64::Engine;

/// Instruction sent with every image.
pub const ANALYSIS_PROMPT: &str = r#"You are an expert AI tutor. Analyze this image of study material (handwritten notes, a whiteboard, or a textbook page).
1. Write a concise "summary" of the key concepts (at most 4 sentences).
2. Write a "quiz" of exactly 3 multiple-choice questions about the content. Each question has exactly 4 "options", and its "answer" is the full text of the correct option.
IMPORTANT: Return RAW JSON ONLY. No Markdown. No code fences. No backslashes.
Format: {"summary": "...", "quiz": [{"question": "...", "options": ["...", "...", "...", "..."], "answer": "..."}]}"#;

/// Base64-encoded image ready to send to a model API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and format string.
    ///
    /// The format is the image format identifier (e.g., "jpeg", "png", "webp").
    pub fn from_bytes(bytes: &[u8], format: &str) -> Self {
        let media_type = match format {
            "jpeg" | "jpg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            "bmp" => "image/bmp",
            "tiff" => "image/tiff",
            other => {
                tracing::warn!("Unknown image format '{other}', defaulting to image/jpeg");
                "image/jpeg"
            }
        };

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }
}

/// A request to analyze one image.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// The image to analyze
    pub image: ImageInput,
    /// Text prompt for the model
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl LlmRequest {
    /// Build the summary-and-quiz request for an image.
    pub fn analyze_notes(image: ImageInput, temperature: f32, max_tokens: u32) -> Self {
        Self {
            image,
            prompt: ANALYSIS_PROMPT.to_string(),
            max_tokens,
            temperature,
        }
    }
}

/// The response from a generation call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated text, untrimmed of fences
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// One entry of the remote model catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogModel {
    /// Bare model identifier, without any `models/` prefix
    pub name: String,
    /// Generation methods the model supports (e.g., "generateContent")
    pub supported_generation_methods: Vec<String>,
}

impl CatalogModel {
    /// Whether the model can answer a content generation request.
    pub fn supports_generate_content(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == "generateContent")
    }
}

/// Client for the remote generative model service.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the relay holds an `Arc<dyn ModelClient>`).
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Service name for logging (e.g., "gemini").
    fn name(&self) -> &str;

    /// List every model the service currently offers.
    async fn list_models(&self) -> Result<Vec<CatalogModel>, ModelError>;

    /// Run one generation request against `model`.
    async fn generate(&self, model: &str, request: &LlmRequest)
        -> Result<LlmResponse, ModelError>;
}
