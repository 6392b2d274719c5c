//! Configuration management for MathAgent services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/<env>.toml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Embedding collaborator configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Web search collaborator configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Generative model collaborator configuration
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Resolution pipeline tunables
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Feedback store configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    /// Embedding provider: openai, local
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// API key for the embedding service
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    pub api_base: Option<String>,

    /// Model to use
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding dimension
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// Request timeout in seconds
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries
    #[serde(default = "default_embedding_retries")]
    pub max_retries: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Google Custom Search API key; search is disabled when absent
    pub api_key: Option<String>,

    /// Google Custom Search engine id (cx)
    pub engine_id: Option<String>,

    /// Maximum results requested per search
    #[serde(default = "default_search_max_results")]
    pub max_results: usize,

    /// Request timeout in seconds
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

impl SearchConfig {
    /// Search is only usable with both credentials present.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.engine_id.is_some()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// API key for the generative model; fallback-only when absent
    pub api_key: Option<String>,

    /// API endpoint
    #[serde(default = "default_generation_endpoint")]
    pub endpoint: String,

    /// Sampling temperature (low for consistent math solutions)
    #[serde(default = "default_generation_temperature")]
    pub temperature: f32,

    /// Maximum output tokens
    #[serde(default = "default_generation_max_tokens")]
    pub max_output_tokens: usize,

    /// Request timeout in seconds
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

/// Tunables for the resolution pipeline. The thresholds are reference
/// behavior, not derived values; they are configuration on purpose.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Classifier acceptance threshold on the [0,1] math score
    #[serde(default = "default_accept_threshold")]
    pub accept_threshold: f32,

    /// Maximum question length in characters
    #[serde(default = "default_max_question_len")]
    pub max_question_len: usize,

    /// Retrieval confidence below which web search is attempted
    #[serde(default = "default_search_trigger_threshold")]
    pub search_trigger_threshold: f32,

    /// Top-k entries fetched from the knowledge index
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Character budget for the composed synthesis context
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,

    /// Maximum references attached to an answer
    #[serde(default = "default_max_sources")]
    pub max_sources: usize,

    /// Answer confidence when the primary model produced the text
    #[serde(default = "default_primary_confidence")]
    pub primary_confidence: f32,

    /// Answer confidence when the deterministic fallback produced the text
    #[serde(default = "default_fallback_confidence")]
    pub fallback_confidence: f32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL for the feedback store
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Maximum number of connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }
fn default_request_timeout() -> u64 { 60 }
fn default_shutdown_timeout() -> u64 { 30 }
fn default_embedding_provider() -> String { "local".to_string() }
fn default_embedding_model() -> String { "text-embedding-3-small".to_string() }
fn default_embedding_dimension() -> usize { 384 }
fn default_embedding_timeout() -> u64 { 30 }
fn default_embedding_retries() -> u32 { 3 }
fn default_search_max_results() -> usize { 5 }
fn default_search_timeout() -> u64 { 10 }
fn default_generation_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        .to_string()
}
fn default_generation_temperature() -> f32 { 0.1 }
fn default_generation_max_tokens() -> usize { 2048 }
fn default_generation_timeout() -> u64 { 30 }
fn default_accept_threshold() -> f32 { 0.3 }
fn default_max_question_len() -> usize { 1000 }
fn default_search_trigger_threshold() -> f32 { 0.7 }
fn default_top_k() -> usize { 5 }
fn default_max_context_chars() -> usize { 6000 }
fn default_max_sources() -> usize { 3 }
fn default_primary_confidence() -> f32 { 0.90 }
fn default_fallback_confidence() -> f32 { 0.75 }
fn default_database_url() -> String { "sqlite://mathagent.db?mode=rwc".to_string() }
fn default_max_connections() -> u32 { 5 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { false }
fn default_metrics_port() -> u16 { 9090 }
fn default_service_name() -> String { "mathagent".to_string() }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables with APP__ prefix
            // e.g., APP__SERVER__PORT=8001
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            api_key: None,
            api_base: None,
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            timeout_secs: default_embedding_timeout(),
            max_retries: default_embedding_retries(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            engine_id: None,
            max_results: default_search_max_results(),
            timeout_secs: default_search_timeout(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_generation_endpoint(),
            temperature: default_generation_temperature(),
            max_output_tokens: default_generation_max_tokens(),
            timeout_secs: default_generation_timeout(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            accept_threshold: default_accept_threshold(),
            max_question_len: default_max_question_len(),
            search_trigger_threshold: default_search_trigger_threshold(),
            top_k: default_top_k(),
            max_context_chars: default_max_context_chars(),
            max_sources: default_max_sources(),
            primary_confidence: default_primary_confidence(),
            fallback_confidence: default_fallback_confidence(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_port: default_metrics_port(),
            service_name: default_service_name(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            embedding: EmbeddingConfig::default(),
            search: SearchConfig::default(),
            generation: GenerationConfig::default(),
            pipeline: PipelineConfig::default(),
            database: DatabaseConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.pipeline.search_trigger_threshold, 0.7);
        assert_eq!(config.pipeline.accept_threshold, 0.3);
        assert_eq!(config.pipeline.max_sources, 3);
    }

    #[test]
    fn test_search_unconfigured_by_default() {
        let config = AppConfig::default();
        assert!(!config.search.is_configured());
    }
}
