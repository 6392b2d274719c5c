//! Query resolution handler

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use mathagent_common::errors::{AppError, Result};
use mathagent_common::types::{Answer, Question};

/// Request to resolve a math question
#[derive(Debug, Deserialize, Validate)]
pub struct QueryRequest {
    #[validate(length(min = 1, max = 1000))]
    pub question: String,

    /// Optional preceding conversation or problem setup
    #[serde(default)]
    pub context: Option<String>,

    /// Optional requester identifier for feedback attribution
    #[serde(default)]
    pub user_id: Option<String>,
}

/// A resolved answer
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub query_id: Uuid,
    pub answer: String,
    pub confidence: f32,
    pub sources: Vec<String>,
    pub reasoning_steps: Vec<String>,
    pub used_web_search: bool,
    pub web_result_count: usize,
    pub kb_confidence: f32,
}

impl From<Answer> for QueryResponse {
    fn from(answer: Answer) -> Self {
        Self {
            query_id: answer.query_id,
            answer: answer.text,
            confidence: answer.confidence,
            sources: answer.sources,
            reasoning_steps: answer.reasoning_steps,
            used_web_search: answer.used_web_search,
            web_result_count: answer.web_result_count,
            kb_confidence: answer.kb_confidence,
        }
    }
}

/// Resolve a question through the pipeline
pub async fn resolve_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: Some("question".to_string()),
    })?;

    let mut question = Question::new(request.question.clone());
    question.context = request.context;
    question.user_id = request.user_id;

    let answer = state.pipeline.resolve(&question).await?;

    // Best-effort: a logging failure must not lose the answer
    if let Err(e) = state
        .store
        .log_query(&request.question, question.user_id.as_deref(), &answer)
        .await
    {
        tracing::warn!(query_id = %answer.query_id, error = %e, "Failed to log query");
    }

    Ok(Json(answer.into()))
}
