//! Knowledge retrieval stage
//!
//! Embeds the question and queries the vector index. Retrieval confidence
//! is the best match similarity, clamped to [0, 1]. Collaborator failures
//! degrade to the empty result rather than failing the request; the
//! downstream augmenter then treats the question as uncovered.

use crate::index::VectorIndex;
use mathagent_common::providers::Embedder;
use mathagent_common::types::RetrievalResult;
use std::sync::Arc;

pub struct KnowledgeRetriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    top_k: usize,
}

impl KnowledgeRetriever {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>, top_k: usize) -> Self {
        Self {
            embedder,
            index,
            top_k,
        }
    }

    /// Retrieve the closest knowledge entries for a question. Never fails:
    /// an embedder or index error yields the degraded empty result.
    pub async fn retrieve(&self, question: &str) -> RetrievalResult {
        let query = match self.embedder.embed(question).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "Embedding failed, degrading to empty retrieval");
                return RetrievalResult::empty();
            }
        };

        let matches = match self.index.query(&query, self.top_k).await {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(error = %e, "Index query failed, degrading to empty retrieval");
                return RetrievalResult::empty();
            }
        };

        let confidence = matches
            .first()
            .map(|m| m.similarity.clamp(0.0, 1.0))
            .unwrap_or(0.0);

        tracing::debug!(
            matches = matches.len(),
            confidence,
            "Knowledge retrieval complete"
        );

        RetrievalResult {
            confidence,
            matches,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{InMemoryIndex, IndexedEntry};
    use crate::knowledge::seed_index;
    use async_trait::async_trait;
    use mathagent_common::errors::{AppError, Result};
    use mathagent_common::providers::HashEmbedder;
    use mathagent_common::types::KnowledgeMatch;

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(AppError::EmbeddingError {
                message: "down".to_string(),
            })
        }
        fn model_name(&self) -> &str {
            "failing"
        }
        fn dimension(&self) -> usize {
            0
        }
    }

    struct FailingIndex;

    #[async_trait]
    impl VectorIndex for FailingIndex {
        async fn add(&self, _entry: IndexedEntry) -> Result<()> {
            Ok(())
        }
        async fn query(&self, _query: &[f32], _top_k: usize) -> Result<Vec<KnowledgeMatch>> {
            Err(AppError::Internal {
                message: "down".to_string(),
            })
        }
        async fn len(&self) -> usize {
            0
        }
    }

    #[tokio::test]
    async fn test_retrieval_against_seeded_index() {
        let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(384));
        let index = Arc::new(InMemoryIndex::new());
        seed_index(index.as_ref(), &embedder).await.unwrap();

        let retriever = KnowledgeRetriever::new(embedder, index, 5);
        let result = retriever
            .retrieve("how do I solve the linear equation 2x + 5 = 13")
            .await;

        assert!(!result.matches.is_empty());
        assert!(result.confidence > 0.0);
        assert_eq!(result.matches[0].source, "Linear Equations Guide");
    }

    #[tokio::test]
    async fn test_embedder_failure_degrades_to_empty() {
        let retriever =
            KnowledgeRetriever::new(Arc::new(FailingEmbedder), Arc::new(InMemoryIndex::new()), 5);
        let result = retriever.retrieve("2 + 2").await;
        assert_eq!(result.confidence, 0.0);
        assert!(result.matches.is_empty());
    }

    #[tokio::test]
    async fn test_index_failure_degrades_to_empty() {
        let retriever =
            KnowledgeRetriever::new(Arc::new(HashEmbedder::new(64)), Arc::new(FailingIndex), 5);
        let result = retriever.retrieve("2 + 2").await;
        assert_eq!(result.confidence, 0.0);
        assert!(result.matches.is_empty());
    }

    #[tokio::test]
    async fn test_empty_index_yields_zero_confidence() {
        let retriever = KnowledgeRetriever::new(
            Arc::new(HashEmbedder::new(64)),
            Arc::new(InMemoryIndex::new()),
            5,
        );
        let result = retriever.retrieve("2 + 2").await;
        assert_eq!(result.confidence, 0.0);
    }
}
