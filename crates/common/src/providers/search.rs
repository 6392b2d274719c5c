//! Web search abstraction
//!
//! Provides the [`SearchProvider`] seam the augmenter calls, plus the
//! Google Custom Search client. Safe search is forced on for educational
//! content, and the client fails closed past its timeout.

use crate::config::SearchConfig;
use crate::errors::{AppError, Result};
use crate::types::SearchItem;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Trait for external web search
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search for a query, returning ranked items
    async fn search(&self, query: &str) -> Result<Vec<SearchItem>>;

    /// Provider name for logging and attribution
    fn name(&self) -> &str;
}

/// Google Custom Search API client
pub struct GoogleSearchClient {
    client: reqwest::Client,
    api_key: String,
    engine_id: String,
    max_results: usize,
    base_url: String,
}

#[derive(Deserialize)]
struct CustomSearchResponse {
    #[serde(default)]
    items: Vec<CustomSearchItem>,
}

#[derive(Deserialize)]
struct CustomSearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl GoogleSearchClient {
    /// Create a new client from configuration
    pub fn new(config: &SearchConfig, api_key: String, engine_id: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key,
            engine_id,
            max_results: config.max_results,
            base_url: "https://www.googleapis.com/customsearch/v1".to_string(),
        })
    }
}

#[async_trait]
impl SearchProvider for GoogleSearchClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchItem>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", &self.max_results.to_string()),
                ("safe", "active"),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::UpstreamTimeout { timeout_ms: 10_000 }
                } else {
                    AppError::SearchProviderError {
                        message: format!("Request failed: {}", e),
                    }
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::SearchProviderError {
                message: format!("API error {}: {}", status, body),
            });
        }

        let result: CustomSearchResponse =
            response
                .json()
                .await
                .map_err(|e| AppError::SearchProviderError {
                    message: format!("Failed to parse response: {}", e),
                })?;

        Ok(result
            .items
            .into_iter()
            .take(self.max_results)
            .map(|item| SearchItem {
                title: item.title,
                url: item.link,
                snippet: item.snippet,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "google-custom-search"
    }
}

/// Create a search provider from configuration. Returns `None` when
/// credentials are absent; the augmenter then reports attempted-but-failed
/// for every triggered search.
pub fn create_search_provider(config: &SearchConfig) -> Result<Option<Arc<dyn SearchProvider>>> {
    match (&config.api_key, &config.engine_id) {
        (Some(key), Some(cx)) if !key.is_empty() && !cx.is_empty() => Ok(Some(Arc::new(
            GoogleSearchClient::new(config, key.clone(), cx.clone())?,
        ))),
        _ => {
            tracing::warn!("Search API credentials not configured - search fallback disabled");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parsing_tolerates_missing_items() {
        let parsed: CustomSearchResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.items.is_empty());
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{
            "items": [
                {"title": "Solve 2x+5=13", "link": "https://example.com/a", "snippet": "x = 4"}
            ]
        }"#;
        let parsed: CustomSearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].title, "Solve 2x+5=13");
    }

    #[test]
    fn test_unconfigured_provider_is_none() {
        let config = SearchConfig::default();
        assert!(create_search_provider(&config).unwrap().is_none());
    }
}
