//! Generative completion abstraction
//!
//! Provides the [`GenerativeModel`] seam the synthesizer calls, plus the
//! Gemini `generateContent` HTTP client. The client fails closed: any
//! error, non-200 status, or empty candidate list becomes an `Err` the
//! synthesizer converts into its deterministic fallback path.

use crate::config::GenerationConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Trait for generative completion
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Complete a prompt into answer text
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Gemini generateContent client
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    temperature: f32,
    max_output_tokens: usize,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationParams,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationParams {
    temperature: f32,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: usize,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

impl GeminiClient {
    /// Create a new client from configuration
    pub fn new(config: &GenerationConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key,
            endpoint: config.endpoint.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationParams {
                temperature: self.temperature,
                top_k: 1,
                top_p: 0.8,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("X-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::GenerationError {
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::GenerationError {
                message: format!("API error {}: {}", status, body),
            });
        }

        let result: GenerateResponse =
            response
                .json()
                .await
                .map_err(|e| AppError::GenerationError {
                    message: format!("Failed to parse response: {}", e),
                })?;

        result
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| AppError::GenerationError {
                message: "Empty response from model".to_string(),
            })
    }

    fn model_name(&self) -> &str {
        "gemini-2.0-flash"
    }
}

/// Create a generative model from configuration. Returns `None` when no
/// API key is configured; the pipeline then always takes the fallback path.
pub fn create_generative_model(
    config: &GenerationConfig,
) -> Result<Option<Arc<dyn GenerativeModel>>> {
    match &config.api_key {
        Some(key) if !key.is_empty() => {
            Ok(Some(Arc::new(GeminiClient::new(config, key.clone())?)))
        }
        _ => {
            tracing::info!("No generation API key configured, using fallback solutions only");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "prompt".into(),
                }],
            }],
            generation_config: GenerationParams {
                temperature: 0.1,
                top_k: 1,
                top_p: 0.8,
                max_output_tokens: 2048,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "prompt");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[test]
    fn test_unconfigured_model_is_none() {
        let config = GenerationConfig::default();
        assert!(create_generative_model(&config).unwrap().is_none());
    }
}
