//! MathAgent Common Library
//!
//! Shared code for the MathAgent services including:
//! - Pipeline data model (questions, verdicts, retrieval and search
//!   results, answers)
//! - Collaborator abstractions (embedding, web search, generative model)
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod errors;
pub mod metrics;
pub mod providers;
pub mod types;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{AppError, RejectionReason, Result};
pub use providers::{Embedder, GenerativeModel, SearchProvider};
pub use types::{Answer, Question};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
