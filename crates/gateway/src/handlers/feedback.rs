//! Feedback handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::feedback::{FeedbackRecord, FeedbackType};
use crate::AppState;
use mathagent_common::errors::{AppError, Result};

/// Request to leave feedback on a resolved query
#[derive(Debug, Deserialize, Validate)]
pub struct FeedbackRequest {
    pub query_id: Uuid,

    pub feedback_type: FeedbackType,

    #[serde(default)]
    #[validate(length(max = 5000))]
    pub feedback_text: Option<String>,

    #[serde(default)]
    #[validate(length(max = 10000))]
    pub corrected_answer: Option<String>,

    #[serde(default)]
    #[validate(length(max = 50))]
    pub user_id: Option<String>,
}

#[derive(Serialize)]
pub struct FeedbackResponse {
    pub feedback_id: Uuid,
    pub query_id: Uuid,
    pub status: String,
}

#[derive(Serialize)]
pub struct FeedbackListResponse {
    pub query_id: Uuid,
    pub feedback: Vec<FeedbackRecord>,
}

/// Record feedback for a resolved query
pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(request): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let feedback_id = state
        .store
        .add_feedback(
            request.query_id,
            request.feedback_type,
            request.feedback_text.as_deref(),
            request.corrected_answer.as_deref(),
            request.user_id.as_deref(),
        )
        .await?;

    tracing::info!(
        query_id = %request.query_id,
        feedback_type = request.feedback_type.as_str(),
        "Feedback recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(FeedbackResponse {
            feedback_id,
            query_id: request.query_id,
            status: "recorded".to_string(),
        }),
    ))
}

/// List feedback recorded for a query
pub async fn get_feedback(
    State(state): State<AppState>,
    Path(query_id): Path<Uuid>,
) -> Result<Json<FeedbackListResponse>> {
    let feedback = state.store.feedback_for(query_id).await?;
    Ok(Json(FeedbackListResponse { query_id, feedback }))
}
