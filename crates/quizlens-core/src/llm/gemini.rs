//! Gemini client using the Generative Language REST API.
//!
//! Lists the model catalog and sends prompt + inline base64 image via
//! `generateContent`. The API key travels in the `x-goog-api-key` header so
//! it never appears in request URLs or logs.

use super::provider::{CatalogModel, LlmRequest, LlmResponse, ModelClient};
use crate::error::ModelError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Upper bound on catalog pages followed, in case a token never clears.
const MAX_CATALOG_PAGES: usize = 20;

/// Gemini REST client.
pub struct GeminiClient {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(endpoint: &str, api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn request_error(context: &str, e: reqwest::Error) -> ModelError {
        ModelError::Request {
            message: format!("Gemini {context} failed: {e}"),
            status_code: e.status().map(|s| s.as_u16()),
        }
    }

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ModelError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let text = resp.text().await.unwrap_or_default();
        Err(ModelError::Request {
            message: format!("Gemini HTTP {status}: {}", text.trim()),
            status_code: Some(status.as_u16()),
        })
    }
}

// --- Catalog types ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelEntry {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

// --- Request types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

// --- Response types ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u32>,
}

#[async_trait]
impl ModelClient for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn list_models(&self) -> Result<Vec<CatalogModel>, ModelError> {
        let url = format!("{}/models", self.endpoint);
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_CATALOG_PAGES {
            let mut req = self
                .client
                .get(&url)
                .header("x-goog-api-key", &self.api_key)
                .query(&[("pageSize", "1000")]);
            if let Some(token) = &page_token {
                req = req.query(&[("pageToken", token.as_str())]);
            }

            let resp = req
                .send()
                .await
                .map_err(|e| Self::request_error("model listing", e))?;
            let page: ListModelsResponse = Self::check_status(resp)
                .await?
                .json()
                .await
                .map_err(|e| Self::request_error("model listing decode", e))?;

            models.extend(page.models.into_iter().map(|m| CatalogModel {
                name: m
                    .name
                    .strip_prefix("models/")
                    .unwrap_or(&m.name)
                    .to_string(),
                supported_generation_methods: m.supported_generation_methods,
            }));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => return Ok(models),
            }
        }

        tracing::warn!("Model catalog still paginating after {MAX_CATALOG_PAGES} pages; truncating");
        Ok(models)
    }

    async fn generate(
        &self,
        model: &str,
        request: &LlmRequest,
    ) -> Result<LlmResponse, ModelError> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, model);
        let start = Instant::now();

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part {
                        text: Some(request.prompt.clone()),
                        inline_data: None,
                    },
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: request.image.media_type.clone(),
                            data: request.image.data.clone(),
                        }),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        };

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::request_error("request", e))?;

        let gen_resp: GenerateContentResponse = Self::check_status(resp)
            .await?
            .json()
            .await
            .map_err(|e| Self::request_error("response decode", e))?;

        let text = gen_resp
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ModelError::EmptyResponse {
                model: model.to_string(),
            });
        }

        Ok(LlmResponse {
            text,
            model: gen_resp.model_version.unwrap_or_else(|| model.to_string()),
            tokens_used: gen_resp.usage_metadata.and_then(|u| u.total_token_count),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::ImageInput;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> LlmRequest {
        LlmRequest::analyze_notes(ImageInput::from_bytes(&[0xFF, 0xD8, 0xFF], "jpeg"), 0.2, 512)
    }

    #[tokio::test]
    async fn test_list_models_strips_prefix_and_follows_pages() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/models"))
            .and(header("x-goog-api-key", "test-key"))
            .and(query_param("pageToken", "page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [
                    {"name": "models/embedding-001", "supportedGenerationMethods": ["embedContent"]}
                ]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/models"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [
                    {"name": "models/gemini-pro-latest", "supportedGenerationMethods": ["generateContent"]},
                    {"name": "models/gemini-flash-latest", "supportedGenerationMethods": ["generateContent", "countTokens"]}
                ],
                "nextPageToken": "page-2"
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&server.uri(), "test-key");
        let models = client.list_models().await.unwrap();
        let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["gemini-pro-latest", "gemini-flash-latest", "embedding-001"]
        );
        assert!(!models[2].supports_generate_content());
    }

    #[tokio::test]
    async fn test_list_models_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key invalid"))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&server.uri(), "bad-key");
        let err = client.list_models().await.unwrap_err();
        assert_eq!(err.status_code(), Some(403));
        assert!(err.to_string().contains("API key invalid"));
    }

    #[tokio::test]
    async fn test_generate_sends_prompt_and_inline_image() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-flash-latest:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "generationConfig": {"maxOutputTokens": 512}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "{\"summary\":"}, {"text": "\"ok\"}"}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 300, "candidatesTokenCount": 20, "totalTokenCount": 320},
                "modelVersion": "gemini-flash-latest"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(&server.uri(), "test-key");
        let resp = client
            .generate("gemini-flash-latest", &request())
            .await
            .unwrap();
        assert_eq!(resp.text, "{\"summary\":\"ok\"}");
        assert_eq!(resp.tokens_used, Some(320));
        assert_eq!(resp.model, "gemini-flash-latest");

        let received = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], crate::llm::provider::ANALYSIS_PROMPT);
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[1]["inlineData"]["data"], "/9j/");
    }

    #[tokio::test]
    async fn test_generate_quota_error_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-pro-latest:generateContent"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Resource has been exhausted"))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&server.uri(), "test-key");
        let err = client
            .generate("gemini-pro-latest", &request())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(429));
        assert!(err.to_string().contains("exhausted"));
    }

    #[tokio::test]
    async fn test_generate_without_text_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-flash-latest:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"finishReason": "SAFETY"}]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&server.uri(), "test-key");
        let err = client
            .generate("gemini-flash-latest", &request())
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::EmptyResponse { .. }));
    }
}
