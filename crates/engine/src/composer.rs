//! Synthesis context composition
//!
//! Pure stage: renders the question, caller context, retrieved knowledge
//! and web snippets into a single provenance-tagged text under a character
//! budget. When the budget is exceeded, web snippets are truncated first,
//! then retrieved knowledge; the question itself is never truncated.

use mathagent_common::types::{RetrievalResult, SearchOutcome, SynthesisContext};

pub struct ContextComposer {
    max_chars: usize,
}

impl ContextComposer {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn compose(
        &self,
        question: &str,
        caller_context: Option<&str>,
        retrieval: &RetrievalResult,
        search: &SearchOutcome,
    ) -> SynthesisContext {
        let question_block = format!("[question]\n{}", question.trim());

        let context_block = caller_context
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| format!("[context]\n{}", c));

        let retrieved_block = if retrieval.matches.is_empty() {
            None
        } else {
            let body = retrieval
                .matches
                .iter()
                .map(|m| format!("[knowledge: {}]\n{}", m.source, m.content))
                .collect::<Vec<_>>()
                .join("\n\n");
            Some(body)
        };

        let search_block = {
            let items = search.items();
            if items.is_empty() {
                None
            } else {
                let body = items
                    .iter()
                    .map(|i| format!("[web: {} ({})]\n{}", i.title, i.url, i.snippet))
                    .collect::<Vec<_>>()
                    .join("\n\n");
                Some(body)
            }
        };

        // Reserved budget: question and caller context are kept whole.
        let fixed_len = question_block.chars().count()
            + context_block
                .as_ref()
                .map(|b| b.chars().count() + 2)
                .unwrap_or(0);

        let mut remaining = self.max_chars.saturating_sub(fixed_len);

        // Retrieved knowledge claims budget before web snippets. Every
        // appended block also pays for the "\n\n" join preceding it.
        let retrieved_text = retrieved_block.map(|b| {
            let kept = truncate_chars(&b, remaining.saturating_sub(2));
            remaining = remaining.saturating_sub(kept.chars().count() + 2);
            kept
        });

        let search_text = search_block
            .map(|b| truncate_chars(&b, remaining.saturating_sub(2)))
            .filter(|b| !b.is_empty());
        let retrieved_text = retrieved_text.filter(|b| !b.is_empty());

        let mut parts = vec![question_block];
        if let Some(c) = &context_block {
            parts.push(c.clone());
        }
        if let Some(r) = &retrieved_text {
            parts.push(r.clone());
        }
        if let Some(s) = &search_text {
            parts.push(s.clone());
        }

        SynthesisContext {
            question: question.trim().to_string(),
            caller_context: caller_context.map(|c| c.trim().to_string()),
            retrieved_text,
            search_text,
            assembled: parts.join("\n\n"),
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect()
    }
}
