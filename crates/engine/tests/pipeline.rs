//! End-to-end pipeline tests with scripted collaborators.

use async_trait::async_trait;
use mathagent_common::config::AppConfig;
use mathagent_common::errors::{AppError, RejectionReason, Result};
use mathagent_common::providers::{Embedder, GenerativeModel, HashEmbedder, SearchProvider};
use mathagent_common::types::{Question, SearchItem};
use mathagent_engine::{seed_index, Pipeline};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct ScriptedSearch {
    items: Vec<SearchItem>,
    calls: AtomicUsize,
}

impl ScriptedSearch {
    fn with_items(n: usize) -> Arc<Self> {
        Arc::new(Self {
            items: (0..n)
                .map(|i| SearchItem {
                    title: format!("Math reference {}", i),
                    url: format!("https://example.com/ref/{}", i),
                    snippet: format!("snippet {}", i),
                })
                .collect(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl SearchProvider for ScriptedSearch {
    async fn search(&self, _query: &str) -> Result<Vec<SearchItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.clone())
    }
    fn name(&self) -> &str {
        "scripted"
    }
}

struct ScriptedModel {
    reply: String,
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Ok(self.reply.clone())
    }
    fn model_name(&self) -> &str {
        "scripted"
    }
}

struct FailingModel;

#[async_trait]
impl GenerativeModel for FailingModel {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(AppError::GenerationError {
            message: "unavailable".to_string(),
        })
    }
    fn model_name(&self) -> &str {
        "failing"
    }
}

async fn seeded_pipeline(
    search: Option<Arc<dyn SearchProvider>>,
    model: Option<Arc<dyn GenerativeModel>>,
) -> Pipeline {
    let config = AppConfig::default();
    let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(384));
    let pipeline = Pipeline::new(&config, Arc::clone(&embedder), search, model);
    seed_index(pipeline.index().as_ref(), &embedder)
        .await
        .unwrap();
    pipeline
}

#[tokio::test]
async fn arithmetic_resolves_via_fallback() {
    let pipeline = seeded_pipeline(None, None).await;
    let answer = pipeline.resolve(&Question::new("2 + 2")).await.unwrap();

    assert!(answer.text.contains("4"), "answer was:\n{}", answer.text);
    assert_eq!(answer.confidence, 0.75);
    assert!(!answer.reasoning_steps.is_empty());
}

#[tokio::test]
async fn linear_equation_resolves_to_negative_root() {
    let pipeline = seeded_pipeline(None, None).await;
    let answer = pipeline
        .resolve(&Question::new("Solve 2x + 4 = 2"))
        .await
        .unwrap();

    assert!(answer.text.contains("x = -1"), "answer was:\n{}", answer.text);
}

#[tokio::test]
async fn non_math_question_is_rejected() {
    let pipeline = seeded_pipeline(None, None).await;
    let err = pipeline
        .resolve(&Question::new("What's the weather in Paris?"))
        .await
        .unwrap_err();

    match err {
        AppError::Rejected { reason } => {
            assert_eq!(reason, RejectionReason::NonMathematical);
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn empty_question_is_rejected() {
    let pipeline = seeded_pipeline(None, None).await;
    let err = pipeline.resolve(&Question::new("   ")).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Rejected {
            reason: RejectionReason::EmptyInput
        }
    ));
}

#[tokio::test]
async fn oversized_question_is_rejected() {
    let pipeline = seeded_pipeline(None, None).await;
    let err = pipeline
        .resolve(&Question::new("1+".repeat(600)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Rejected {
            reason: RejectionReason::TooLong
        }
    ));
}

#[tokio::test]
async fn low_confidence_triggers_search() {
    // Hash embeddings give an obscure question low similarity to the seeds
    let search = ScriptedSearch::with_items(2);
    let pipeline = seeded_pipeline(Some(search.clone()), None).await;

    let answer = pipeline
        .resolve(&Question::new(
            "evaluate the contour integral of a meromorphic residue kernel 71 + 88",
        ))
        .await
        .unwrap();

    assert_eq!(search.calls.load(Ordering::SeqCst), 1);
    assert!(answer.used_web_search);
    assert_eq!(answer.web_result_count, 2);
    assert!(answer
        .sources
        .iter()
        .any(|s| s.contains("https://example.com/ref/0")));
}

#[tokio::test]
async fn primary_model_answer_gets_high_confidence() {
    let model = Arc::new(ScriptedModel {
        reply: "**Step 1:** Add the operands.\n**Final Answer:** 4".to_string(),
    });
    let pipeline = seeded_pipeline(None, Some(model)).await;

    let answer = pipeline.resolve(&Question::new("2 + 2")).await.unwrap();
    assert_eq!(answer.confidence, 0.90);
    assert!(answer
        .reasoning_steps
        .iter()
        .any(|s| s == "Add the operands."));
}

#[tokio::test]
async fn refusal_model_reply_degrades_to_fallback_answer() {
    let model = Arc::new(ScriptedModel {
        reply: "I cannot help with that request.".to_string(),
    });
    let pipeline = seeded_pipeline(None, Some(model)).await;

    let answer = pipeline.resolve(&Question::new("2 + 2")).await.unwrap();
    assert_eq!(answer.confidence, 0.75);
    assert!(answer.text.contains("**Final Answer:** 4"));
    assert!(!answer.text.contains("cannot help"));
}

#[tokio::test]
async fn harmful_model_reply_degrades_to_fallback_answer() {
    let model = Arc::new(ScriptedModel {
        reply: "**Step 1:** Hack the calculator service to read the answer 4.".to_string(),
    });
    let pipeline = seeded_pipeline(None, Some(model)).await;

    let answer = pipeline.resolve(&Question::new("2 + 2")).await.unwrap();
    assert_eq!(answer.confidence, 0.75);
    assert!(answer.text.contains("**Final Answer:** 4"));
    assert!(!answer.text.to_lowercase().contains("hack"));
}

#[tokio::test]
async fn model_failure_degrades_to_fallback_answer() {
    let pipeline = seeded_pipeline(None, Some(Arc::new(FailingModel))).await;

    let answer = pipeline
        .resolve(&Question::new("Solve 2x + 4 = 2"))
        .await
        .unwrap();
    assert_eq!(answer.confidence, 0.75);
    assert!(answer.text.contains("x = -1"));
}

#[tokio::test]
async fn sources_are_capped_at_three() {
    let pipeline = seeded_pipeline(Some(ScriptedSearch::with_items(5)), None).await;

    let answer = pipeline
        .resolve(&Question::new(
            "evaluate the contour integral of a meromorphic residue kernel 71 + 88",
        ))
        .await
        .unwrap();
    assert!(answer.sources.len() <= 3);
}

#[tokio::test]
async fn kb_confidence_is_reported_unmodified() {
    let pipeline = seeded_pipeline(None, None).await;
    let answer = pipeline
        .resolve(&Question::new("how do I solve the linear equation 2x + 5 = 13"))
        .await
        .unwrap();

    assert!(answer.kb_confidence > 0.0);
    assert!(answer.kb_confidence <= 1.0);
}

#[tokio::test]
async fn resolution_is_deterministic_without_model() {
    let pipeline = seeded_pipeline(None, None).await;
    let a = pipeline.resolve(&Question::new("2 + 2")).await.unwrap();
    let b = pipeline.resolve(&Question::new("2 + 2")).await.unwrap();

    assert_eq!(a.text, b.text);
    assert_eq!(a.confidence, b.confidence);
    assert_eq!(a.sources, b.sources);
    // Ids differ per resolution
    assert_ne!(a.query_id, b.query_id);
}
