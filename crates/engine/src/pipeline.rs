//! The resolution pipeline
//!
//! Wires the stages in order: classify, retrieve, augment, compose,
//! synthesize, assemble. A rejected classification short-circuits into an
//! error carrying the reason; every later stage degrades instead of
//! failing, so an accepted question always produces an answer.

use crate::assembler::ResponseAssembler;
use crate::augmenter::SearchAugmenter;
use crate::classifier::Classifier;
use crate::composer::ContextComposer;
use crate::index::{InMemoryIndex, VectorIndex};
use crate::retriever::KnowledgeRetriever;
use crate::synthesizer::AnswerSynthesizer;
use mathagent_common::config::AppConfig;
use mathagent_common::errors::{AppError, Result};
use mathagent_common::metrics::{record_rejection, record_resolve};
use mathagent_common::providers::{Embedder, GenerativeModel, SearchProvider};
use mathagent_common::types::{Answer, Question};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

pub struct Pipeline {
    classifier: Classifier,
    retriever: KnowledgeRetriever,
    augmenter: SearchAugmenter,
    composer: ContextComposer,
    synthesizer: AnswerSynthesizer,
    assembler: ResponseAssembler,
    index: Arc<dyn VectorIndex>,
}

impl Pipeline {
    /// Assemble a pipeline from configuration and collaborators. The index
    /// starts empty; call [`Pipeline::index`] and seed it before serving.
    pub fn new(
        config: &AppConfig,
        embedder: Arc<dyn Embedder>,
        search: Option<Arc<dyn SearchProvider>>,
        model: Option<Arc<dyn GenerativeModel>>,
    ) -> Self {
        let index: Arc<dyn VectorIndex> = Arc::new(InMemoryIndex::new());
        Self::with_index(config, embedder, search, model, index)
    }

    /// Assemble a pipeline over an existing index.
    pub fn with_index(
        config: &AppConfig,
        embedder: Arc<dyn Embedder>,
        search: Option<Arc<dyn SearchProvider>>,
        model: Option<Arc<dyn GenerativeModel>>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            classifier: Classifier::new(&config.pipeline),
            retriever: KnowledgeRetriever::new(
                embedder,
                Arc::clone(&index),
                config.pipeline.top_k,
            ),
            augmenter: SearchAugmenter::new(
                search,
                &config.pipeline,
                config.search.timeout_secs,
                config.search.max_results,
            ),
            composer: ContextComposer::new(config.pipeline.max_context_chars),
            synthesizer: AnswerSynthesizer::new(model, config.generation.timeout_secs),
            assembler: ResponseAssembler::new(&config.pipeline),
            index,
        }
    }

    /// The knowledge index behind the retriever, for seeding.
    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    /// Resolve a question into an answer, or a rejection error when the
    /// classifier turns it away.
    pub async fn resolve(&self, question: &Question) -> Result<Answer> {
        let started = Instant::now();
        let query_id = Uuid::new_v4();

        let verdict = self.classifier.classify(&question.text);
        if let Some(reason) = verdict.rejection_reason {
            tracing::info!(
                %query_id,
                score = verdict.score,
                reason = reason.as_str(),
                "Question rejected"
            );
            record_rejection(reason.as_str());
            return Err(AppError::Rejected { reason });
        }

        tracing::debug!(%query_id, score = verdict.score, "Question accepted");

        let retrieval = self.retriever.retrieve(&question.text).await;
        let search = self.augmenter.augment(question, retrieval.confidence).await;

        let context = self.composer.compose(
            &question.text,
            question.context.as_deref(),
            &retrieval,
            &search,
        );

        let draft = self.synthesizer.synthesize(&context).await;
        let used_primary = draft.used_primary_model;

        let answer = self.assembler.assemble(query_id, draft, &retrieval, &search);

        let elapsed = started.elapsed().as_secs_f64();
        record_resolve(elapsed, answer.used_web_search, used_primary);
        tracing::info!(
            %query_id,
            confidence = answer.confidence,
            kb_confidence = answer.kb_confidence,
            used_web_search = answer.used_web_search,
            used_primary_model = used_primary,
            elapsed_secs = elapsed,
            "Question resolved"
        );

        Ok(answer)
    }
}
