//! Error types for MathAgent services
//!
//! Provides:
//! - Distinct error types for different failure modes
//! - HTTP status code mapping
//! - Structured error responses
//! - Error codes for client handling
//!
//! Only input rejection is ever surfaced to the caller of the resolution
//! pipeline; collaborator failures (embedding, search, generation) are
//! degraded inside the pipeline and exist here for the clients themselves.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Reason a question was rejected before entering the pipeline proper.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    EmptyInput,
    TooLong,
    NonMathematical,
    UnsafeContent,
}

impl RejectionReason {
    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::EmptyInput => "empty_input",
            RejectionReason::TooLong => "too_long",
            RejectionReason::NonMathematical => "non_mathematical",
            RejectionReason::UnsafeContent => "unsafe_content",
        }
    }

    /// Human-readable message shown to the caller.
    pub fn message(&self) -> &'static str {
        match self {
            RejectionReason::EmptyInput => "Empty query is not allowed",
            RejectionReason::TooLong => "Query exceeds the maximum allowed length",
            RejectionReason::NonMathematical => {
                "Please enter a valid math question. Only mathematical questions are allowed."
            }
            RejectionReason::UnsafeContent => "Query contains potentially harmful content",
        }
    }

    /// Suggestion string included in rejection responses.
    pub fn suggestion(&self) -> &'static str {
        match self {
            RejectionReason::NonMathematical => {
                "Try asking questions like 'Solve 2x + 5 = 13' or 'What is the derivative of x^2?'"
            }
            _ => "Ask a single mathematical question in plain text",
        }
    }
}

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    QuestionRejected,

    // Resource errors (4xxx)
    NotFound,
    QueryNotFound,

    // Storage errors (7xxx)
    DatabaseError,

    // External service errors (8xxx)
    EmbeddingError,
    SearchProviderError,
    GenerationError,
    UpstreamTimeout,
    HttpClientError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 1001,
            ErrorCode::QuestionRejected => 1002,
            ErrorCode::NotFound => 4001,
            ErrorCode::QueryNotFound => 4002,
            ErrorCode::DatabaseError => 7001,
            ErrorCode::EmbeddingError => 8001,
            ErrorCode::SearchProviderError => 8002,
            ErrorCode::GenerationError => 8003,
            ErrorCode::UpstreamTimeout => 8004,
            ErrorCode::HttpClientError => 8005,
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("{}", reason.message())]
    Rejected { reason: RejectionReason },

    // Resource errors
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound { resource_type: String, id: String },

    // Storage errors
    #[error("Database error: {message}")]
    Database { message: String },

    // External service errors
    #[error("Embedding service error: {message}")]
    EmbeddingError { message: String },

    #[error("Search provider error: {message}")]
    SearchProviderError { message: String },

    #[error("Generation error: {message}")]
    GenerationError { message: String },

    #[error("Upstream call timed out after {timeout_ms}ms")]
    UpstreamTimeout { timeout_ms: u64 },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    // Internal errors
    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::Rejected { .. } => ErrorCode::QuestionRejected,
            AppError::NotFound { .. } => ErrorCode::NotFound,
            AppError::Database { .. } => ErrorCode::DatabaseError,
            AppError::EmbeddingError { .. } => ErrorCode::EmbeddingError,
            AppError::SearchProviderError { .. } => ErrorCode::SearchProviderError,
            AppError::GenerationError { .. } => ErrorCode::GenerationError,
            AppError::UpstreamTimeout { .. } => ErrorCode::UpstreamTimeout,
            // Only timed-out client calls share the timeout code;
            // connection, TLS, and builder failures keep their own
            AppError::HttpClient(e) if e.is_timeout() => ErrorCode::UpstreamTimeout,
            AppError::HttpClient(_) => ErrorCode::HttpClientError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. } | AppError::Rejected { .. } => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,

            // 500 Internal Server Error
            AppError::Database { .. }
            | AppError::Internal { .. }
            | AppError::Configuration { .. }
            | AppError::Serialization(_)
            | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,

            // 502 Bad Gateway
            AppError::EmbeddingError { .. }
            | AppError::SearchProviderError { .. }
            | AppError::GenerationError { .. }
            | AppError::UpstreamTimeout { .. }
            | AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Structured error response for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectionReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let (reason, suggestion) = match &self {
            AppError::Rejected { reason } => {
                (Some(*reason), Some(reason.suggestion().to_string()))
            }
            _ => (None, None),
        };

        let body = ErrorResponse {
            error: ErrorDetails {
                code,
                message,
                reason,
                suggestion,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}
