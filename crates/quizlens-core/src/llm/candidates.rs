//! Candidate model selection.
//!
//! Produces the ordered list of models a request will try. In fixed mode
//! that is the single configured model. In auto mode the remote catalog is
//! listed, unusable and blocked models are dropped, and preferred models
//! move to the front without disturbing relative order. Listing failures
//! and listings that overrun their budget fall back to a configured list,
//! ordered the same way.

use super::provider::ModelClient;
use crate::config::{DiscoveryMode, GeminiConfig};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Where a candidate list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    Fixed,
    Catalog,
    CachedCatalog,
    Fallback,
}

/// Produces the per-request candidate list.
pub struct CandidateSelector {
    mode: DiscoveryMode,
    fixed_model: String,
    fallback_models: Vec<String>,
    blocked_markers: Vec<String>,
    preferred_marker: String,
    ttl: Duration,
    discovery_timeout: Duration,
    cache: RwLock<Option<(Instant, Vec<String>)>>,
}

impl CandidateSelector {
    pub fn new(config: &GeminiConfig) -> Self {
        Self {
            mode: config.discovery,
            fixed_model: config.model.clone(),
            fallback_models: config.fallback_models.clone(),
            blocked_markers: config.blocked_markers.clone(),
            preferred_marker: config.preferred_marker.clone(),
            ttl: Duration::from_secs(config.catalog_ttl_secs),
            discovery_timeout: Duration::from_millis(config.discovery_timeout_ms),
            cache: RwLock::new(None),
        }
    }

    pub fn mode(&self) -> DiscoveryMode {
        self.mode
    }

    /// Ordered candidates for one request, plus where they came from.
    pub async fn candidates(&self, client: &dyn ModelClient) -> (Vec<String>, CandidateSource) {
        if self.mode == DiscoveryMode::Fixed {
            return (vec![self.fixed_model.clone()], CandidateSource::Fixed);
        }

        if !self.ttl.is_zero() {
            if let Some((listed_at, names)) = self.cache.read().await.as_ref() {
                if listed_at.elapsed() < self.ttl {
                    return (names.clone(), CandidateSource::CachedCatalog);
                }
            }
        }

        tracing::debug!("Listing models from {}", client.name());
        let listing = tokio::time::timeout(self.discovery_timeout, client.list_models()).await;
        let discovered = match listing {
            Ok(Ok(models)) => {
                let names: Vec<String> = models
                    .into_iter()
                    .filter(|m| m.supports_generate_content())
                    .map(|m| m.name)
                    .collect();
                let ordered =
                    order_candidates(names, &self.blocked_markers, &self.preferred_marker);
                if ordered.is_empty() {
                    tracing::warn!("Model catalog had no usable models; using fallback list");
                }
                ordered
            }
            Ok(Err(e)) => {
                tracing::warn!(status = ?e.status_code(), "Could not list models: {e}");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.discovery_timeout.as_millis() as u64,
                    "Model listing timed out"
                );
                Vec::new()
            }
        };

        if discovered.is_empty() {
            let fallback = order_candidates(
                self.fallback_models.clone(),
                &self.blocked_markers,
                &self.preferred_marker,
            );
            return (fallback, CandidateSource::Fallback);
        }

        tracing::info!(
            count = discovered.len(),
            top = ?discovered.iter().take(5).collect::<Vec<_>>(),
            "Discovered candidate models"
        );

        if !self.ttl.is_zero() {
            *self.cache.write().await = Some((Instant::now(), discovered.clone()));
        }
        (discovered, CandidateSource::Catalog)
    }
}

/// Drop names containing any blocked marker, then move names containing
/// `preferred` to the front. Both groups keep their original order.
pub fn order_candidates(names: Vec<String>, blocked: &[String], preferred: &str) -> Vec<String> {
    let (mut first, rest): (Vec<String>, Vec<String>) = names
        .into_iter()
        .filter(|name| !blocked.iter().any(|b| !b.is_empty() && name.contains(b.as_str())))
        .partition(|name| !preferred.is_empty() && name.contains(preferred));
    first.extend(rest);
    first
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::llm::provider::{CatalogModel, LlmRequest, LlmResponse};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// Catalog-only client; generation is never exercised here.
    struct CatalogClient {
        catalog: Result<Vec<CatalogModel>, ModelError>,
        list_calls: AtomicU32,
        delay: Option<Duration>,
    }

    impl CatalogClient {
        fn listing(names: &[&str]) -> Self {
            Self {
                catalog: Ok(names
                    .iter()
                    .map(|n| CatalogModel {
                        name: n.to_string(),
                        supported_generation_methods: vec!["generateContent".to_string()],
                    })
                    .collect()),
                list_calls: AtomicU32::new(0),
                delay: None,
            }
        }

        fn failing() -> Self {
            Self {
                catalog: Err(ModelError::Request {
                    message: "connection refused".to_string(),
                    status_code: None,
                }),
                list_calls: AtomicU32::new(0),
                delay: None,
            }
        }
    }

    #[async_trait]
    impl ModelClient for CatalogClient {
        fn name(&self) -> &str {
            "catalog"
        }

        async fn list_models(&self) -> Result<Vec<CatalogModel>, ModelError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.catalog.clone()
        }

        async fn generate(
            &self,
            _model: &str,
            _request: &LlmRequest,
        ) -> Result<LlmResponse, ModelError> {
            unreachable!("candidate selection never generates")
        }
    }

    #[test]
    fn test_order_excludes_blocked_and_prefers_flash() {
        let ordered = order_candidates(
            strings(&["gemini-pro-latest", "gemini-flash-latest", "gemini-2.0-exp"]),
            &strings(&["2.0", "exp"]),
            "flash",
        );
        assert_eq!(ordered, strings(&["gemini-flash-latest", "gemini-pro-latest"]));
    }

    #[test]
    fn test_order_is_stable_within_groups() {
        let ordered = order_candidates(
            strings(&["pro-a", "flash-a", "pro-b", "flash-b", "pro-c"]),
            &[],
            "flash",
        );
        assert_eq!(
            ordered,
            strings(&["flash-a", "flash-b", "pro-a", "pro-b", "pro-c"])
        );
    }

    #[test]
    fn test_order_blocks_any_marker() {
        let ordered = order_candidates(
            strings(&["gemini-2.0-flash", "gemini-exp-1206", "gemini-1.5-flash"]),
            &strings(&["2.0", "exp"]),
            "flash",
        );
        assert_eq!(ordered, strings(&["gemini-1.5-flash"]));
    }

    #[tokio::test]
    async fn test_fixed_mode_skips_catalog() {
        let config = GeminiConfig {
            discovery: DiscoveryMode::Fixed,
            model: "gemini-1.5-flash".to_string(),
            ..GeminiConfig::default()
        };
        let client = CatalogClient::listing(&["gemini-pro-latest"]);
        let (names, source) = CandidateSelector::new(&config).candidates(&client).await;
        assert_eq!(names, strings(&["gemini-1.5-flash"]));
        assert_eq!(source, CandidateSource::Fixed);
        assert_eq!(client.list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_auto_mode_filters_unsupported_methods() {
        let client = CatalogClient {
            catalog: Ok(vec![
                CatalogModel {
                    name: "text-embedding-004".to_string(),
                    supported_generation_methods: vec!["embedContent".to_string()],
                },
                CatalogModel {
                    name: "gemini-pro-latest".to_string(),
                    supported_generation_methods: vec!["generateContent".to_string()],
                },
            ]),
            list_calls: AtomicU32::new(0),
            delay: None,
        };
        let (names, source) = CandidateSelector::new(&GeminiConfig::default())
            .candidates(&client)
            .await;
        assert_eq!(names, strings(&["gemini-pro-latest"]));
        assert_eq!(source, CandidateSource::Catalog);
    }

    #[tokio::test]
    async fn test_listing_failure_uses_fallback() {
        let client = CatalogClient::failing();
        let (names, source) = CandidateSelector::new(&GeminiConfig::default())
            .candidates(&client)
            .await;
        assert_eq!(
            names,
            strings(&[
                "gemini-flash-latest",
                "gemini-1.5-flash-latest",
                "gemini-pro-latest"
            ])
        );
        assert_eq!(source, CandidateSource::Fallback);
    }

    #[tokio::test]
    async fn test_empty_catalog_uses_fallback() {
        let client = CatalogClient::listing(&["gemini-2.0-flash-exp"]);
        let (_, source) = CandidateSelector::new(&GeminiConfig::default())
            .candidates(&client)
            .await;
        assert_eq!(source, CandidateSource::Fallback);
    }

    #[tokio::test]
    async fn test_catalog_cached_within_ttl() {
        let client = CatalogClient::listing(&["gemini-pro-latest", "gemini-flash-latest"]);
        let selector = CandidateSelector::new(&GeminiConfig::default());

        let (first, source) = selector.candidates(&client).await;
        assert_eq!(source, CandidateSource::Catalog);
        let (second, source) = selector.candidates(&client).await;
        assert_eq!(source, CandidateSource::CachedCatalog);

        assert_eq!(first, second);
        assert_eq!(client.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_lists_every_time() {
        let config = GeminiConfig {
            catalog_ttl_secs: 0,
            ..GeminiConfig::default()
        };
        let client = CatalogClient::listing(&["gemini-flash-latest"]);
        let selector = CandidateSelector::new(&config);
        selector.candidates(&client).await;
        selector.candidates(&client).await;
        assert_eq!(client.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fallback_not_cached() {
        let client = CatalogClient::failing();
        let selector = CandidateSelector::new(&GeminiConfig::default());
        selector.candidates(&client).await;
        selector.candidates(&client).await;
        assert_eq!(client.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stalled_listing_uses_fallback_within_budget() {
        let config = GeminiConfig {
            discovery_timeout_ms: 50,
            ..GeminiConfig::default()
        };
        let client = CatalogClient {
            delay: Some(Duration::from_secs(3600)),
            ..CatalogClient::listing(&["gemini-pro-latest"])
        };
        let selector = CandidateSelector::new(&config);

        let (names, source) = tokio::time::timeout(
            Duration::from_secs(5),
            selector.candidates(&client),
        )
        .await
        .expect("listing should be abandoned after the discovery budget");
        assert_eq!(source, CandidateSource::Fallback);
        assert_eq!(names[0], "gemini-flash-latest");

        // Nothing cached: the next request lists again
        selector.candidates(&client).await;
        assert_eq!(client.list_calls.load(Ordering::SeqCst), 2);
    }
}
