//! The analysis relay: upload bytes in, summary-and-quiz JSON out.
//!
//! ```text
//! bytes → decode → candidates → try each in order → sanitize → parse → JSON
//! ```
//!
//! Candidates are tried strictly one after another. A failed candidate is
//! never retried; the next one is tried instead, and only the last failure
//! is reported if all of them fail.

use crate::config::{Config, CredentialPolicy, DiscoveryMode};
use crate::error::{AnalyzeError, ConfigError, ModelError};
use crate::llm::{CandidateSelector, CandidateSource, GeminiClient, ImageInput, LlmRequest, ModelClient};
use crate::pipeline::decode::format_to_string;
use crate::pipeline::{DecodedImage, ImageDecoder};
use crate::sanitize::parse_model_output;
use crate::types::AnalysisResult;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Tunables copied out of [`Config`] at construction.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Budget for one candidate call in milliseconds
    pub llm_timeout_ms: u64,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_output_tokens: u32,
    /// Reject payloads that break the quiz contract
    pub strict_quiz: bool,
}

impl AnalyzeOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            llm_timeout_ms: config.limits.llm_timeout_ms,
            temperature: config.gemini.temperature,
            max_output_tokens: config.gemini.max_output_tokens,
            strict_quiz: config.validation.strict_quiz,
        }
    }
}

/// Relays uploaded images to the remote model and returns its parsed answer.
///
/// Immutable after construction and safe to share across requests.
pub struct Analyzer {
    client: Option<Arc<dyn ModelClient>>,
    selector: CandidateSelector,
    decoder: ImageDecoder,
    options: AnalyzeOptions,
    fixed_model: String,
}

impl Analyzer {
    /// Build an analyzer backed by Gemini, honouring the credential policy.
    ///
    /// Strict: a missing key is an error and the caller must not serve.
    /// Lenient: the analyzer is built without a client and every request
    /// fails with [`AnalyzeError::NotConfigured`].
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        match config.gemini.resolved_api_key() {
            Some(key) => {
                let client = GeminiClient::new(&config.gemini.endpoint, &key);
                Ok(Self::with_client(Arc::new(client), config))
            }
            None => match config.credentials.policy {
                CredentialPolicy::Strict => Err(ConfigError::MissingCredential(format!(
                    "gemini.api_key resolved to nothing (configured as '{}'); set GEMINI_API_KEY",
                    config.gemini.api_key
                ))),
                CredentialPolicy::Lenient => {
                    tracing::error!(
                        "No Gemini API key found; starting anyway, analysis requests will fail"
                    );
                    Ok(Self::build(None, config))
                }
            },
        }
    }

    /// Build an analyzer around an existing client.
    pub fn with_client(client: Arc<dyn ModelClient>, config: &Config) -> Self {
        Self::build(Some(client), config)
    }

    fn build(client: Option<Arc<dyn ModelClient>>, config: &Config) -> Self {
        Self {
            client,
            selector: CandidateSelector::new(&config.gemini),
            decoder: ImageDecoder::new(config.limits.clone()),
            options: AnalyzeOptions::from_config(config),
            fixed_model: config.gemini.model.clone(),
        }
    }

    /// Whether a remote client is available.
    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Human-readable model label reported by `GET /`.
    pub fn model_label(&self) -> String {
        match self.selector.mode() {
            DiscoveryMode::Fixed => self.fixed_model.clone(),
            DiscoveryMode::Auto => "auto".to_string(),
        }
    }

    fn client(&self) -> Result<&Arc<dyn ModelClient>, AnalyzeError> {
        self.client.as_ref().ok_or_else(|| {
            AnalyzeError::NotConfigured("Gemini API key is not configured".to_string())
        })
    }

    /// The candidate list a request would use right now.
    pub async fn candidates(&self) -> Result<(Vec<String>, CandidateSource), AnalyzeError> {
        let client = self.client()?;
        Ok(self.selector.candidates(client.as_ref()).await)
    }

    /// Analyze one uploaded image.
    pub async fn analyze(&self, bytes: Vec<u8>) -> Result<Value, AnalyzeError> {
        let client = self.client()?;

        let decoded = self.decoder.decode_from_bytes(bytes).await?;
        tracing::debug!(
            format = %format_to_string(decoded.format),
            width = decoded.width,
            height = decoded.height,
            bytes = decoded.byte_len,
            "Decoded upload"
        );

        // Pixels are only needed for validation; only the base64 payload outlives this
        let DecodedImage {
            image: pixels,
            format,
            bytes,
            ..
        } = decoded;
        drop(pixels);
        let image = ImageInput::from_bytes(&bytes, &format_to_string(format));
        drop(bytes);
        let request = LlmRequest::analyze_notes(
            image,
            self.options.temperature,
            self.options.max_output_tokens,
        );

        let (candidates, source) = self.selector.candidates(client.as_ref()).await;
        tracing::debug!(?source, count = candidates.len(), "Candidate models selected");

        let text = self.first_success(client.as_ref(), &candidates, &request).await?;

        let value = parse_model_output(&text).map_err(|e| {
            tracing::error!("Failed to parse model output: {e}");
            e
        })?;

        if self.options.strict_quiz {
            let result: AnalysisResult = serde_json::from_value(value.clone())
                .map_err(|e| AnalyzeError::InvalidQuiz(e.to_string()))?;
            result.validate().map_err(AnalyzeError::InvalidQuiz)?;
        }

        Ok(value)
    }

    /// Read an image from disk and analyze it.
    pub async fn analyze_file(&self, path: &Path) -> crate::Result<Value> {
        let bytes = tokio::fs::read(path).await?;
        tracing::info!(bytes = bytes.len(), "Analyzing {:?}", path);
        Ok(self.analyze(bytes).await?)
    }

    /// Try candidates in order; return the first successful text.
    async fn first_success(
        &self,
        client: &dyn ModelClient,
        candidates: &[String],
        request: &LlmRequest,
    ) -> Result<String, AnalyzeError> {
        let budget = Duration::from_millis(self.options.llm_timeout_ms);
        let mut last_error: Option<ModelError> = None;

        for (attempt, model) in candidates.iter().enumerate() {
            tracing::info!(model = %model, attempt = attempt + 1, "Trying model");

            let outcome = match tokio::time::timeout(budget, client.generate(model, request)).await
            {
                Ok(result) => result,
                Err(_) => Err(ModelError::Timeout {
                    model: model.clone(),
                    timeout_ms: self.options.llm_timeout_ms,
                }),
            };

            match outcome {
                Ok(response) => {
                    tracing::info!(
                        model = %model,
                        served_by = %response.model,
                        latency_ms = response.latency_ms,
                        tokens = ?response.tokens_used,
                        "Model succeeded"
                    );
                    return Ok(response.text);
                }
                Err(e) => {
                    tracing::warn!(model = %model, status = ?e.status_code(), "Model failed: {e}");
                    last_error = Some(e);
                }
            }
        }

        tracing::error!(attempted = candidates.len(), "All models failed");
        Err(AnalyzeError::AllCandidatesFailed {
            attempted: candidates.len(),
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no candidate models available".to_string()),
        })
    }
}
