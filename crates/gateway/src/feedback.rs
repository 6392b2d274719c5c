//! Feedback store
//!
//! SQLite persistence for resolved queries and user feedback. Tables are
//! created on startup if missing. Query logging after a resolution is
//! best-effort: a storage failure is logged and the answer still goes
//! out. Feedback submission is not best-effort; the caller gets the
//! error.

use chrono::Utc;
use mathagent_common::config::DatabaseConfig;
use mathagent_common::errors::{AppError, Result};
use mathagent_common::types::Answer;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Kind of feedback a user can leave on a resolved query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    Positive,
    Negative,
    Correction,
    Clarification,
}

impl FeedbackType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackType::Positive => "positive",
            FeedbackType::Negative => "negative",
            FeedbackType::Correction => "correction",
            FeedbackType::Clarification => "clarification",
        }
    }
}

/// A stored feedback row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FeedbackRecord {
    pub feedback_id: String,
    pub query_id: String,
    pub feedback_type: String,
    pub feedback_text: Option<String>,
    pub corrected_answer: Option<String>,
    pub user_id: Option<String>,
    pub created_at: String,
}

#[derive(Clone)]
pub struct FeedbackStore {
    pool: SqlitePool,
}

impl FeedbackStore {
    /// Connect and create tables if missing.
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(|e| AppError::Database {
                message: format!("Failed to connect to {}: {}", config.url, e),
            })?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS query_logs (
                query_id TEXT PRIMARY KEY,
                question TEXT NOT NULL,
                answer TEXT NOT NULL,
                confidence REAL NOT NULL,
                sources TEXT NOT NULL,
                used_web_search INTEGER NOT NULL,
                user_id TEXT,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS feedback (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                feedback_id TEXT UNIQUE NOT NULL,
                query_id TEXT NOT NULL,
                feedback_type TEXT NOT NULL,
                feedback_text TEXT,
                corrected_answer TEXT,
                user_id TEXT,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_feedback_query_id ON feedback (query_id)")
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(())
    }

    /// Connectivity check for the readiness probe.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Record a resolved query for later feedback attribution.
    pub async fn log_query(
        &self,
        question: &str,
        user_id: Option<&str>,
        answer: &Answer,
    ) -> Result<()> {
        let sources = serde_json::to_string(&answer.sources)?;

        sqlx::query(
            "INSERT INTO query_logs
             (query_id, question, answer, confidence, sources, used_web_search, user_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(answer.query_id.to_string())
        .bind(question)
        .bind(&answer.text)
        .bind(answer.confidence as f64)
        .bind(sources)
        .bind(answer.used_web_search as i64)
        .bind(user_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// Store feedback against a logged query. Fails with `NotFound` when
    /// the query id was never logged.
    pub async fn add_feedback(
        &self,
        query_id: Uuid,
        feedback_type: FeedbackType,
        feedback_text: Option<&str>,
        corrected_answer: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<Uuid> {
        let exists: Option<(String,)> =
            sqlx::query_as("SELECT query_id FROM query_logs WHERE query_id = ?")
                .bind(query_id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        if exists.is_none() {
            return Err(AppError::NotFound {
                resource_type: "query".to_string(),
                id: query_id.to_string(),
            });
        }

        let feedback_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO feedback
             (feedback_id, query_id, feedback_type, feedback_text, corrected_answer, user_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(feedback_id.to_string())
        .bind(query_id.to_string())
        .bind(feedback_type.as_str())
        .bind(feedback_text)
        .bind(corrected_answer)
        .bind(user_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(feedback_id)
    }

    /// All feedback recorded for a query, oldest first.
    pub async fn feedback_for(&self, query_id: Uuid) -> Result<Vec<FeedbackRecord>> {
        let records = sqlx::query_as::<_, FeedbackRecord>(
            "SELECT feedback_id, query_id, feedback_type, feedback_text,
                    corrected_answer, user_id, created_at
             FROM feedback WHERE query_id = ? ORDER BY id",
        )
        .bind(query_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(records)
    }
}

fn db_err(e: sqlx::Error) -> AppError {
    AppError::Database {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> FeedbackStore {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        };
        FeedbackStore::new(&config).await.unwrap()
    }

    fn answer(query_id: Uuid) -> Answer {
        Answer {
            query_id,
            text: "**Final Answer:** 4".to_string(),
            confidence: 0.75,
            sources: vec!["Linear Equations Guide".to_string()],
            reasoning_steps: vec![],
            used_web_search: false,
            web_result_count: 0,
            kb_confidence: 0.2,
        }
    }

    #[tokio::test]
    async fn test_log_and_feedback_roundtrip() {
        let store = memory_store().await;
        let id = Uuid::new_v4();
        store.log_query("2 + 2", None, &answer(id)).await.unwrap();

        store
            .add_feedback(id, FeedbackType::Positive, Some("clear steps"), None, None)
            .await
            .unwrap();
        store
            .add_feedback(
                id,
                FeedbackType::Correction,
                None,
                Some("the answer is 4"),
                Some("user-7"),
            )
            .await
            .unwrap();

        let records = store.feedback_for(id).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].feedback_type, "positive");
        assert_eq!(records[0].feedback_text.as_deref(), Some("clear steps"));
        assert_eq!(records[1].feedback_type, "correction");
        assert_eq!(records[1].corrected_answer.as_deref(), Some("the answer is 4"));
        assert_eq!(records[1].user_id.as_deref(), Some("user-7"));
    }

    #[tokio::test]
    async fn test_feedback_for_unknown_query_is_not_found() {
        let store = memory_store().await;
        let err = store
            .add_feedback(Uuid::new_v4(), FeedbackType::Negative, None, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_feedback_for_query_without_feedback_is_empty() {
        let store = memory_store().await;
        let id = Uuid::new_v4();
        store.log_query("2 + 2", None, &answer(id)).await.unwrap();
        assert!(store.feedback_for(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ping() {
        let store = memory_store().await;
        store.ping().await.unwrap();
    }

    #[test]
    fn test_feedback_type_parses_snake_case() {
        let parsed: FeedbackType = serde_json::from_str("\"correction\"").unwrap();
        assert_eq!(parsed, FeedbackType::Correction);
        assert!(serde_json::from_str::<FeedbackType>("\"rant\"").is_err());
    }
}
