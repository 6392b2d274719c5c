//! In-memory vector index
//!
//! Provides:
//! - [`VectorIndex`] trait for storing and querying embedded entries
//! - [`InMemoryIndex`], a cosine-similarity index over a guarded Vec
//!
//! The index is small (tens of entries seeded at startup) so a linear scan
//! under a read lock is the right shape. Similarities are clamped to be
//! non-negative; they are comparable only within a single query.

use async_trait::async_trait;
use mathagent_common::errors::{AppError, Result};
use mathagent_common::types::KnowledgeMatch;
use std::sync::RwLock;

/// An entry stored in the index.
#[derive(Debug, Clone)]
pub struct IndexedEntry {
    /// Text that was embedded
    pub content: String,

    /// Source label for attribution
    pub source: String,

    /// Embedding vector (L2-normalized by the embedder)
    pub embedding: Vec<f32>,
}

/// Trait for vector storage and similarity queries
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Add an entry to the index
    async fn add(&self, entry: IndexedEntry) -> Result<()>;

    /// Return the `top_k` entries most similar to `query`, ordered by
    /// descending similarity
    async fn query(&self, query: &[f32], top_k: usize) -> Result<Vec<KnowledgeMatch>>;

    /// Number of stored entries
    async fn len(&self) -> usize;
}

/// Linear-scan cosine index over an in-process Vec
pub struct InMemoryIndex {
    entries: RwLock<Vec<IndexedEntry>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn add(&self, entry: IndexedEntry) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| AppError::Internal {
            message: "Index lock poisoned".to_string(),
        })?;
        entries.push(entry);
        Ok(())
    }

    async fn query(&self, query: &[f32], top_k: usize) -> Result<Vec<KnowledgeMatch>> {
        let entries = self.entries.read().map_err(|_| AppError::Internal {
            message: "Index lock poisoned".to_string(),
        })?;

        let mut scored: Vec<KnowledgeMatch> = entries
            .iter()
            .map(|entry| KnowledgeMatch {
                content: entry.content.clone(),
                source: entry.source.clone(),
                similarity: cosine_similarity(query, &entry.embedding).max(0.0),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }
}

/// Cosine similarity of two vectors. Returns 0.0 for mismatched or
/// zero-magnitude inputs.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}
