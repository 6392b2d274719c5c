//! Output moderation
//!
//! Validates generated answer text before it reaches the caller: refusal
//! phrasing, harmful content, length bounds, and a lightweight quality
//! score. Pattern tables are compiled once, same shape as the classifier.
//!
//! An unsafe verdict never reaches the caller as an error; the
//! synthesizer treats it like any other generation failure and takes the
//! deterministic fallback path instead.

use regex_lite::Regex;

const MIN_ANSWER_CHARS: usize = 20;
const MAX_ANSWER_CHARS: usize = 2000;

/// Phrases indicating the model refused instead of answering
const REFUSAL_PHRASES: &[&str] = &[
    "i cannot help with",
    "i'm not able to assist",
    "this request violates",
    "i can't provide information about",
];

/// Verdict on a generated answer. `text` is the cleaned content,
/// truncated when over the length bound.
#[derive(Debug, Clone)]
pub struct ModerationVerdict {
    pub safe: bool,
    pub text: String,
    pub issues: Vec<&'static str>,
    pub confidence: f32,
}

pub struct OutputModerator {
    harmful_patterns: Vec<Regex>,
    quality_patterns: Vec<Regex>,
    structured_pattern: Regex,
    math_symbol_pattern: Regex,
    squeeze_newlines: Regex,
    squeeze_spaces: Regex,
}

impl Default for OutputModerator {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputModerator {
    pub fn new() -> Self {
        let compile = |p: &str| Regex::new(p).expect("invalid moderation pattern");

        Self {
            harmful_patterns: vec![
                compile(r"(?i)\b(personal|private|confidential)\s+information\b"),
                compile(r"(?i)\b(hack|exploit|attack)\b"),
                compile(r"(?i)\b(illegal|unlawful|criminal)\b"),
            ],
            quality_patterns: vec![
                compile(r"(?i)\b(solution|answer|result|calculation)\b"),
                compile(r"(?i)\b(step|method|approach|process)\b"),
                compile(r"(?i)\b(therefore|thus|hence|so)\b"),
                compile(r"[+\-*/=]"),
                compile(r"\b\d+\b"),
            ],
            structured_pattern: compile(r"(\d+\.|•|\*)\s+"),
            math_symbol_pattern: compile(r"[+\-*/=<>{}\[\]()]"),
            squeeze_newlines: compile(r"\n{3,}"),
            squeeze_spaces: compile(r" {2,}"),
        }
    }

    /// Moderate a generated answer. Harmful content is unsafe outright;
    /// refusal phrasing, sub-minimum length, and low quality each lower
    /// the verdict confidence, and the text is unsafe below 0.4.
    pub fn moderate(&self, content: &str) -> ModerationVerdict {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return ModerationVerdict {
                safe: false,
                text: String::new(),
                issues: vec!["empty_response"],
                confidence: 1.0,
            };
        }

        for pattern in &self.harmful_patterns {
            if pattern.is_match(trimmed) {
                return ModerationVerdict {
                    safe: false,
                    text: trimmed.to_string(),
                    issues: vec!["harmful_content"],
                    confidence: 0.0,
                };
            }
        }

        let mut issues = Vec::new();
        let mut confidence = 1.0f32;
        let mut text = trimmed.to_string();

        if text.chars().count() < MIN_ANSWER_CHARS {
            issues.push("response_too_short");
            confidence -= 0.3;
        }

        if text.chars().count() > MAX_ANSWER_CHARS {
            issues.push("response_too_long");
            text = text.chars().take(MAX_ANSWER_CHARS).collect::<String>() + "...";
            confidence -= 0.1;
        }

        let lower = text.to_lowercase();
        if REFUSAL_PHRASES.iter().any(|p| lower.contains(p)) {
            issues.push("refusal_pattern");
            confidence -= 0.4;
        }

        if self.quality_score(&text) < 0.3 {
            issues.push("low_quality");
            confidence -= 0.3;
        }

        ModerationVerdict {
            safe: confidence > 0.4,
            text: self.clean(&text),
            issues,
            confidence: confidence.max(0.0),
        }
    }

    /// Fraction of quality indicators present, with bonuses for
    /// structured formatting and mathematical notation.
    fn quality_score(&self, content: &str) -> f32 {
        let matched = self
            .quality_patterns
            .iter()
            .filter(|p| p.is_match(content))
            .count();
        let mut score = matched as f32 / self.quality_patterns.len() as f32;

        if self.structured_pattern.is_match(content) {
            score += 0.2;
        }
        if self.math_symbol_pattern.is_match(content) {
            score += 0.1;
        }

        score.min(1.0)
    }

    /// Collapse excessive whitespace; content is otherwise untouched.
    fn clean(&self, content: &str) -> String {
        let content = self.squeeze_newlines.replace_all(content, "\n\n");
        let content = self.squeeze_spaces.replace_all(&content, " ");
        content.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moderator() -> OutputModerator {
        OutputModerator::new()
    }

    #[test]
    fn test_worked_answer_is_safe() {
        let verdict = moderator().moderate(
            "**Step 1:** Subtract 4 from both sides: 2x = -2.\n\
             **Step 2:** Divide both sides by 2.\n\
             **Final Answer:** x = -1",
        );
        assert!(verdict.safe, "issues: {:?}", verdict.issues);
        assert!(verdict.issues.is_empty());
    }

    #[test]
    fn test_refusal_is_unsafe() {
        let verdict = moderator().moderate("I cannot help with that request.");
        assert!(!verdict.safe);
        assert!(verdict.issues.contains(&"refusal_pattern"));
    }

    #[test]
    fn test_harmful_content_is_unsafe_outright() {
        let verdict =
            moderator().moderate("**Step 1:** First, exploit the server to find the answer 4.");
        assert!(!verdict.safe);
        assert_eq!(verdict.issues, vec!["harmful_content"]);
        assert_eq!(verdict.confidence, 0.0);
    }

    #[test]
    fn test_empty_is_unsafe() {
        let verdict = moderator().moderate("   ");
        assert!(!verdict.safe);
        assert_eq!(verdict.issues, vec!["empty_response"]);
    }

    #[test]
    fn test_short_answer_flagged_but_still_safe() {
        let verdict = moderator().moderate("x = 4 is the answer");
        assert!(verdict.safe);
        assert!(verdict.issues.contains(&"response_too_short"));
    }

    #[test]
    fn test_overlong_answer_truncated() {
        let long = format!("**Step 1:** The answer is 4. {}", "so ".repeat(1000));
        let verdict = moderator().moderate(&long);
        assert!(verdict.issues.contains(&"response_too_long"));
        assert!(verdict.text.chars().count() <= MAX_ANSWER_CHARS + 3);
        assert!(verdict.text.ends_with("..."));
    }

    #[test]
    fn test_clean_collapses_whitespace() {
        let verdict = moderator().moderate(
            "**Step 1:** Add  the   operands.\n\n\n\n**Final Answer:** the result is 4",
        );
        assert!(verdict.safe);
        assert!(!verdict.text.contains("  "));
        assert!(!verdict.text.contains("\n\n\n"));
    }

    #[test]
    fn test_unstructured_chatter_is_low_quality() {
        let verdict =
            moderator().moderate("interesting question, mathematics is a wonderful subject indeed");
        assert!(verdict.issues.contains(&"low_quality"));
    }
}
