//! Answer synthesis stage
//!
//! Prompts the generative model with the composed context and a tutor
//! framing that asks for explicit `**Step N:**` and `**Final Answer:**`
//! markers. Model replies pass through output moderation; any model
//! error, timeout, absence, or unsafe reply falls through to the
//! deterministic solver, so this stage always produces a draft.

use crate::fallback::FallbackSolver;
use crate::moderator::OutputModerator;
use mathagent_common::providers::GenerativeModel;
use mathagent_common::types::{SynthesisContext, SynthesisDraft};
use std::sync::Arc;
use std::time::Duration;

pub struct AnswerSynthesizer {
    model: Option<Arc<dyn GenerativeModel>>,
    fallback: FallbackSolver,
    moderator: OutputModerator,
    timeout: Duration,
}

impl AnswerSynthesizer {
    pub fn new(model: Option<Arc<dyn GenerativeModel>>, timeout_secs: u64) -> Self {
        Self {
            model,
            fallback: FallbackSolver::new(),
            moderator: OutputModerator::new(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Produce an answer draft. Infallible: the fallback covers every
    /// model failure mode, including replies rejected by moderation.
    pub async fn synthesize(&self, context: &SynthesisContext) -> SynthesisDraft {
        if let Some(model) = &self.model {
            let prompt = build_prompt(context);
            match tokio::time::timeout(self.timeout, model.complete(&prompt)).await {
                Ok(Ok(text)) if !text.trim().is_empty() => {
                    let verdict = self.moderator.moderate(&text);
                    if verdict.safe {
                        return SynthesisDraft {
                            text: verdict.text,
                            used_primary_model: true,
                        };
                    }
                    tracing::warn!(
                        issues = ?verdict.issues,
                        confidence = verdict.confidence,
                        "Model reply rejected by output moderation, using fallback"
                    );
                }
                Ok(Ok(_)) => {
                    tracing::warn!("Model returned empty text, using fallback");
                }
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "Generation failed, using fallback");
                }
                Err(_) => {
                    tracing::warn!(
                        timeout_secs = self.timeout.as_secs(),
                        "Generation timed out, using fallback"
                    );
                }
            }
        }

        SynthesisDraft {
            text: self.fallback.solve(&context.question),
            used_primary_model: false,
        }
    }
}

/// Tutor prompt. The step and final-answer markers match what the
/// assembler and fallback solver both emit and parse.
fn build_prompt(context: &SynthesisContext) -> String {
    format!(
        "You are an expert mathematics tutor. Solve the problem below with a \
         clear step-by-step explanation a student can follow.\n\n\
         Requirements:\n\
         - Number each step as **Step 1:**, **Step 2:**, and so on.\n\
         - Show the work for every step, not just the result.\n\
         - Verify the result where possible under a **Verification:** heading.\n\
         - End with the result on its own line as **Final Answer:**.\n\n\
         {}\n",
        context.assembled
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mathagent_common::errors::{AppError, Result};

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
                message: "overloaded".to_string(),
            })
        }
        fn model_name(&self) -> &str {
            "failing"
        }
    }

    struct HangingModel;

    #[async_trait]
    impl GenerativeModel for HangingModel {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(String::new())
        }
        fn model_name(&self) -> &str {
            "hanging"
        }
    }

    fn context(question: &str) -> SynthesisContext {
        SynthesisContext {
            question: question.to_string(),
            caller_context: None,
            retrieved_text: None,
            search_text: None,
            assembled: format!("[question]\n{}", question),
        }
    }

    #[tokio::test]
    async fn test_model_reply_used_when_available() {
        let synth = AnswerSynthesizer::new(
            Some(Arc::new(ScriptedModel {
                reply: "**Step 1:** Add.\n**Final Answer:** 4".to_string(),
            })),
            5,
        );
        let draft = synth.synthesize(&context("2 + 2")).await;
        assert!(draft.used_primary_model);
        assert!(draft.text.contains("**Final Answer:** 4"));
    }

    #[tokio::test]
    async fn test_refusal_reply_falls_back() {
        let synth = AnswerSynthesizer::new(
            Some(Arc::new(ScriptedModel {
                reply: "I cannot help with that request.".to_string(),
            })),
            5,
        );
        let draft = synth.synthesize(&context("2 + 2")).await;
        assert!(!draft.used_primary_model);
        assert!(draft.text.contains("**Final Answer:** 4"));
    }

    #[tokio::test]
    async fn test_harmful_reply_falls_back() {
        let synth = AnswerSynthesizer::new(
            Some(Arc::new(ScriptedModel {
                reply: "**Step 1:** First, exploit the grader to obtain the answer 4."
                    .to_string(),
            })),
            5,
        );
        let draft = synth.synthesize(&context("2 + 2")).await;
        assert!(!draft.used_primary_model);
        assert!(draft.text.contains("**Final Answer:** 4"));
    }

    #[tokio::test]
    async fn test_model_reply_whitespace_is_cleaned() {
        let synth = AnswerSynthesizer::new(
            Some(Arc::new(ScriptedModel {
                reply: "**Step 1:** Add  the   operands.\n\n\n\n**Final Answer:** 4".to_string(),
            })),
            5,
        );
        let draft = synth.synthesize(&context("2 + 2")).await;
        assert!(draft.used_primary_model);
        assert!(!draft.text.contains("  "));
        assert!(draft.text.contains("\n\n**Final Answer:** 4"));
    }

    #[tokio::test]
    async fn test_model_failure_falls_back() {
        let synth = AnswerSynthesizer::new(Some(Arc::new(FailingModel)), 5);
        let draft = synth.synthesize(&context("2 + 2")).await;
        assert!(!draft.used_primary_model);
        assert!(draft.text.contains("**Final Answer:** 4"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_model_timeout_falls_back() {
        let synth = AnswerSynthesizer::new(Some(Arc::new(HangingModel)), 1);
        let draft = synth.synthesize(&context("Solve 2x + 4 = 2")).await;
        assert!(!draft.used_primary_model);
        assert!(draft.text.contains("x = -1"));
    }

    #[tokio::test]
    async fn test_empty_model_reply_falls_back() {
        let synth = AnswerSynthesizer::new(
            Some(Arc::new(ScriptedModel {
                reply: "   ".to_string(),
            })),
            5,
        );
        let draft = synth.synthesize(&context("2 + 2")).await;
        assert!(!draft.used_primary_model);
    }

    #[tokio::test]
    async fn test_no_model_uses_fallback() {
        let synth = AnswerSynthesizer::new(None, 5);
        let draft = synth.synthesize(&context("Solve 2x + 4 = 2")).await;
        assert!(!draft.used_primary_model);
        assert!(draft.text.contains("x = -1"));
    }

    #[test]
    fn test_prompt_includes_context_and_markers() {
        let prompt = build_prompt(&context("2 + 2"));
        assert!(prompt.contains("[question]\n2 + 2"));
        assert!(prompt.contains("**Step 1:**"));
        assert!(prompt.contains("**Final Answer:**"));
    }
}
