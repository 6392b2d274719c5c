//! Shared data model for the resolution pipeline
//!
//! Every stage consumes and produces explicit tagged structures so that
//! "augmentation skipped" is a distinguishable state rather than a missing
//! key, and an assembled answer is immutable once built.

use crate::errors::RejectionReason;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An inbound question. Created once per request and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Free-text question body
    pub text: String,

    /// Optional caller-supplied context (e.g. preceding conversation)
    pub context: Option<String>,

    /// Optional requester identifier for feedback attribution
    pub user_id: Option<String>,
}

impl Question {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            context: None,
            user_id: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Outcome of classifying a question. Terminal when `accepted` is false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationVerdict {
    /// Math score in [0, 1]
    pub score: f32,

    /// Whether the question proceeds into the pipeline
    pub accepted: bool,

    /// Set iff `accepted` is false
    pub rejection_reason: Option<RejectionReason>,
}

impl ClassificationVerdict {
    pub fn accepted(score: f32) -> Self {
        Self {
            score,
            accepted: true,
            rejection_reason: None,
        }
    }

    pub fn rejected(score: f32, reason: RejectionReason) -> Self {
        Self {
            score,
            accepted: false,
            rejection_reason: Some(reason),
        }
    }
}

/// A single entry returned from the knowledge index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeMatch {
    /// Stored content (a worked problem or explanation)
    pub content: String,

    /// Source label for attribution
    pub source: String,

    /// Similarity to the query. Non-negative; comparable only within one
    /// retrieval call.
    pub similarity: f32,
}

/// Result of a knowledge base lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Confidence in [0, 1] that the knowledge base covers the question
    pub confidence: f32,

    /// Matches ordered by descending similarity
    pub matches: Vec<KnowledgeMatch>,
}

impl RetrievalResult {
    /// The degraded result: index empty or unavailable.
    pub fn empty() -> Self {
        Self {
            confidence: 0.0,
            matches: Vec::new(),
        }
    }
}

/// One web search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchItem {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Outcome of the augmentation stage. `Skipped` (retrieval confidence was
/// high enough) is distinct from an attempted search that failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Retrieval confidence cleared the threshold; no search was made
    Skipped,

    /// A search was made; `provider_succeeded` is false on error/timeout
    Attempted {
        provider_succeeded: bool,
        items: Vec<SearchItem>,
    },
}

impl SearchOutcome {
    pub fn failed() -> Self {
        SearchOutcome::Attempted {
            provider_succeeded: false,
            items: Vec::new(),
        }
    }

    /// Items if any were found, regardless of outcome variant.
    pub fn items(&self) -> &[SearchItem] {
        match self {
            SearchOutcome::Skipped => &[],
            SearchOutcome::Attempted { items, .. } => items,
        }
    }

    /// True when a search was made and produced at least one item.
    pub fn used(&self) -> bool {
        matches!(self, SearchOutcome::Attempted { items, .. } if !items.is_empty())
    }
}

/// The bounded, provenance-tagged context handed to the synthesizer.
/// Disposable per-request value.
#[derive(Debug, Clone)]
pub struct SynthesisContext {
    /// Question text (never truncated)
    pub question: String,

    /// Caller-supplied context, if any
    pub caller_context: Option<String>,

    /// Retrieved knowledge segment, if any survived the budget
    pub retrieved_text: Option<String>,

    /// Search snippet segment, if present and within budget
    pub search_text: Option<String>,

    /// The full assembled context rendered with provenance tags
    pub assembled: String,
}

/// Raw synthesizer output before assembly.
#[derive(Debug, Clone)]
pub struct SynthesisDraft {
    /// Generated (or fallback) answer text
    pub text: String,

    /// True when the generative model produced the text, false for the
    /// deterministic fallback
    pub used_primary_model: bool,
}

/// The terminal artifact returned to the caller. Immutable once assembled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Unique id for this resolution (feedback attribution)
    pub query_id: Uuid,

    /// Answer text
    pub text: String,

    /// Effective confidence in [0, 1]
    pub confidence: f32,

    /// Up to three references, web results first
    pub sources: Vec<String>,

    /// Step descriptions parsed from the answer text
    pub reasoning_steps: Vec<String>,

    /// Whether web search was attempted and returned results
    pub used_web_search: bool,

    /// Number of web results consulted
    pub web_result_count: usize,

    /// Knowledge base confidence, unmodified
    pub kb_confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_outcome_skipped_vs_failed() {
        assert!(!SearchOutcome::Skipped.used());
        assert!(!SearchOutcome::failed().used());
        // Distinguishable variants
        assert!(matches!(SearchOutcome::Skipped, SearchOutcome::Skipped));
        assert!(matches!(
            SearchOutcome::failed(),
            SearchOutcome::Attempted {
                provider_succeeded: false,
                ..
            }
        ));
    }

    #[test]
    fn test_search_outcome_used() {
        let outcome = SearchOutcome::Attempted {
            provider_succeeded: true,
            items: vec![SearchItem {
                title: "t".into(),
                url: "u".into(),
                snippet: "s".into(),
            }],
        };
        assert!(outcome.used());
        assert_eq!(outcome.items().len(), 1);
    }

    #[test]
    fn test_verdict_invariant() {
        let ok = ClassificationVerdict::accepted(0.8);
        assert!(ok.rejection_reason.is_none());
        let no = ClassificationVerdict::rejected(0.0, RejectionReason::NonMathematical);
        assert!(!no.accepted);
        assert!(no.rejection_reason.is_some());
    }
}
