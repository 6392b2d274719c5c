//! Health check handlers

use crate::AppState;
use axum::{extract::State, Json};
use mathagent_engine::VectorIndex;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub service: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub feedback_store: CheckResult,
    pub knowledge_index: CheckResult,
}

#[derive(Serialize)]
pub struct CheckResult {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Liveness probe - always returns healthy if server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: mathagent_common::VERSION.to_string(),
    })
}

/// Readiness probe - checks the feedback store and knowledge index
pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    let start = std::time::Instant::now();

    let store_check = match state.store.ping().await {
        Ok(_) => CheckResult {
            status: "up".to_string(),
            latency_ms: Some(start.elapsed().as_millis() as u64),
            error: None,
        },
        Err(e) => CheckResult {
            status: "down".to_string(),
            latency_ms: None,
            error: Some(e.to_string()),
        },
    };

    let entries = state.pipeline.index().len().await;
    let index_check = if entries > 0 {
        CheckResult {
            status: "up".to_string(),
            latency_ms: None,
            error: None,
        }
    } else {
        CheckResult {
            status: "down".to_string(),
            latency_ms: None,
            error: Some("knowledge index is empty".to_string()),
        }
    };

    let all_healthy = store_check.status == "up" && index_check.status == "up";

    Json(ReadyResponse {
        status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
        service: state.config.observability.service_name.clone(),
        checks: HealthChecks {
            feedback_store: store_check,
            knowledge_index: index_check,
        },
    })
}
