//! Conditional web search augmentation
//!
//! Runs iff retrieval confidence falls below the trigger threshold. The
//! query is rewritten before dispatch: caller context is prepended, a
//! "mathematics" hint is appended when no math term is already present,
//! and the result is capped at 200 characters. Provider failures and
//! timeouts degrade to an attempted-but-failed outcome; they never fail
//! the request.

use mathagent_common::config::PipelineConfig;
use mathagent_common::metrics::record_augmentation;
use mathagent_common::providers::SearchProvider;
use mathagent_common::types::{Question, SearchOutcome};
use std::sync::Arc;
use std::time::Duration;

const MAX_QUERY_CHARS: usize = 200;

const MATH_HINT_TERMS: &[&str] = &[
    "math",
    "mathematics",
    "equation",
    "solve",
    "calculate",
    "algebra",
    "calculus",
    "geometry",
];

pub struct SearchAugmenter {
    provider: Option<Arc<dyn SearchProvider>>,
    trigger_threshold: f32,
    max_results: usize,
    timeout: Duration,
}

impl SearchAugmenter {
    pub fn new(
        provider: Option<Arc<dyn SearchProvider>>,
        config: &PipelineConfig,
        timeout_secs: u64,
        max_results: usize,
    ) -> Self {
        Self {
            provider,
            trigger_threshold: config.search_trigger_threshold,
            max_results,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Augment with web results when retrieval confidence is low.
    pub async fn augment(&self, question: &Question, retrieval_confidence: f32) -> SearchOutcome {
        if retrieval_confidence >= self.trigger_threshold {
            tracing::debug!(
                retrieval_confidence,
                threshold = self.trigger_threshold,
                "Search skipped, retrieval confidence sufficient"
            );
            return SearchOutcome::Skipped;
        }

        let Some(provider) = &self.provider else {
            tracing::debug!("Search triggered but no provider configured");
            record_augmentation(false, 0);
            return SearchOutcome::failed();
        };

        let query = rewrite_query(question);
        tracing::debug!(provider = provider.name(), query = %query, "Search triggered");

        let outcome = match tokio::time::timeout(self.timeout, provider.search(&query)).await {
            Ok(Ok(mut items)) => {
                items.truncate(self.max_results);
                SearchOutcome::Attempted {
                    provider_succeeded: true,
                    items,
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Search provider failed");
                SearchOutcome::failed()
            }
            Err(_) => {
                tracing::warn!(timeout_secs = self.timeout.as_secs(), "Search timed out");
                SearchOutcome::failed()
            }
        };

        if let SearchOutcome::Attempted {
            provider_succeeded,
            items,
        } = &outcome
        {
            record_augmentation(*provider_succeeded, items.len());
        }

        outcome
    }
}

/// Rewrite a question into a search query: context first, a mathematics
/// hint when absent, capped at 200 characters on a char boundary.
fn rewrite_query(question: &Question) -> String {
    let mut query = match &question.context {
        Some(context) if !context.trim().is_empty() => {
            format!("{} {}", context.trim(), question.text.trim())
        }
        _ => question.text.trim().to_string(),
    };

    let lower = query.to_lowercase();
    if !MATH_HINT_TERMS.iter().any(|t| lower.contains(t)) {
        query.push_str(" mathematics");
    }

    if query.chars().count() > MAX_QUERY_CHARS {
        query = query.chars().take(MAX_QUERY_CHARS).collect();
    }

    query
}
