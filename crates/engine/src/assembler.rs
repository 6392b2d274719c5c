//! Response assembly
//!
//! Final pure stage: fixes the answer confidence from the synthesis path
//! taken, attaches up to `max_sources` references (web results first, then
//! deduplicated knowledge base sources), and parses the step markers out
//! of the answer text into a reasoning trace. The assembled answer is the
//! terminal artifact; nothing mutates it afterwards.

use mathagent_common::config::PipelineConfig;
use mathagent_common::types::{Answer, RetrievalResult, SearchOutcome, SynthesisDraft};
use regex_lite::Regex;
use uuid::Uuid;

pub struct ResponseAssembler {
    primary_confidence: f32,
    fallback_confidence: f32,
    max_sources: usize,
    step_pattern: Regex,
}

impl ResponseAssembler {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            primary_confidence: config.primary_confidence,
            fallback_confidence: config.fallback_confidence,
            max_sources: config.max_sources,
            step_pattern: Regex::new(r"\*\*Step (\d+):\*\*\s*([^\n]+)")
                .expect("invalid step pattern"),
        }
    }

    pub fn assemble(
        &self,
        query_id: Uuid,
        draft: SynthesisDraft,
        retrieval: &RetrievalResult,
        search: &SearchOutcome,
    ) -> Answer {
        let confidence = if draft.used_primary_model {
            self.primary_confidence
        } else {
            self.fallback_confidence
        };

        Answer {
            query_id,
            confidence,
            sources: self.collect_sources(retrieval, search),
            reasoning_steps: self.extract_steps(&draft.text, retrieval, search),
            used_web_search: search.used(),
            web_result_count: search.items().len(),
            kb_confidence: retrieval.confidence,
            text: draft.text,
        }
    }

    /// Web results first, then unique knowledge sources, capped.
    fn collect_sources(&self, retrieval: &RetrievalResult, search: &SearchOutcome) -> Vec<String> {
        let mut sources = Vec::new();

        for item in search.items() {
            sources.push(format!("{} — {}", item.title, item.url));
        }

        for m in &retrieval.matches {
            if !sources.contains(&m.source) {
                sources.push(m.source.clone());
            }
        }

        sources.truncate(self.max_sources);
        sources
    }

    /// Provenance steps first, then the steps parsed from the answer text.
    /// A text without markers gets a generic three-step outline so the
    /// trace is never empty.
    fn extract_steps(
        &self,
        text: &str,
        retrieval: &RetrievalResult,
        search: &SearchOutcome,
    ) -> Vec<String> {
        let mut steps = Vec::new();

        if !retrieval.matches.is_empty() {
            steps.push(format!(
                "Consulted the knowledge base ({} entries matched, confidence {:.2})",
                retrieval.matches.len(),
                retrieval.confidence
            ));
        }
        match search {
            SearchOutcome::Skipped => {}
            SearchOutcome::Attempted {
                provider_succeeded: true,
                items,
            } if !items.is_empty() => {
                steps.push(format!("Consulted web search ({} results)", items.len()));
            }
            SearchOutcome::Attempted { .. } => {
                steps.push("Attempted web search (no results)".to_string());
            }
        }

        let mut parsed: Vec<String> = self
            .step_pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(2).map(|m| m.as_str().trim().to_string()))
            .collect();

        if parsed.is_empty() {
            parsed = vec![
                "Analyzed the problem statement".to_string(),
                "Applied the relevant mathematical method".to_string(),
                "Stated and verified the result".to_string(),
            ];
        }

        steps.extend(parsed);
        steps
    }
}
