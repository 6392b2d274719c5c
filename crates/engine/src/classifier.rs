//! Question classifier
//!
//! Decides whether a question is mathematical and safe to process.
//! Pattern tables are compiled once into an immutable `Classifier` that is
//! shared across requests; classification is deterministic and does no I/O.
//!
//! Negative indicators dominate: a single off-topic hit rejects the
//! question regardless of any positive matches. Otherwise positive
//! indicators accumulate bounded weights, saturating at 1.0, and the
//! question is accepted at the configured threshold.

use mathagent_common::config::PipelineConfig;
use mathagent_common::errors::RejectionReason;
use mathagent_common::types::ClassificationVerdict;
use regex_lite::Regex;

/// A positive indicator with its score contribution
struct WeightedPattern {
    pattern: Regex,
    weight: f32,
}

/// Immutable classifier over compiled pattern tables
pub struct Classifier {
    accept_threshold: f32,
    max_question_len: usize,
    unsafe_patterns: Vec<Regex>,
    negative_patterns: Vec<Regex>,
    positive_patterns: Vec<WeightedPattern>,
}

impl Classifier {
    pub fn new(config: &PipelineConfig) -> Self {
        let compile = |p: &str| Regex::new(p).expect("invalid classifier pattern");

        let unsafe_patterns = vec![
            compile(r"\b(hack|exploit|attack|malicious)\b"),
            compile(r"\b(personal|private|confidential)\s+information\b"),
            compile(r"\b(generate|create)\s+(virus|malware|harmful)\b"),
        ];

        // Phrasing that clearly indicates non-mathematical content
        let negative_patterns = vec![
            compile(r"\b(weather|temperature|climate|rain|snow|sunny|cloudy)\b"),
            compile(r"\b(cook|recipe|food|eat|drink|restaurant|kitchen)\b"),
            compile(r"\b(movie|film|actor|actress|cinema|theater)\b"),
            compile(r"\b(music|song|singer|band|album|concert)\b"),
            compile(r"\b(car|drive|traffic|road|highway|parking)\b"),
            compile(r"\b(health|doctor|medicine|hospital|sick|disease)\b"),
            compile(r"\b(politics|government|president|election|vote)\b"),
            compile(r"\b(sports|football|basketball|soccer|tennis)\b"),
            compile(r"\b(travel|vacation|hotel|flight|airport|tourist)\b"),
            compile(r"\b(shopping|store|buy|sell|price|dollar)\b"),
            compile(r"\b(job|career|office|business|company)\b"),
            compile(r"\b(teacher|student|homework|grade)\b"),
            compile(r"\b(family|friend|relationship|love|marriage)\b"),
            compile(r"\b(software|internet|website|email)\b"),
            compile(r"\b(book|read|story|novel|author)\b"),
        ];

        let positive_patterns = vec![
            // Operations and keywords
            wp(r"\b(solve|calculate|compute|find|derive|integrate|differentiate|evaluate|simplify|determine)\b", 0.1),
            wp(r"\b(equation|formula|function|theorem|proof|graph|matrix|vector|expression)\b", 0.1),
            wp(r"\b(algebra|calculus|geometry|trigonometry|statistics|probability|arithmetic|mathematics|math)\b", 0.15),
            // Operators and symbols
            wp(r"[+\-*/=<>^%]", 0.1),
            wp(r"[×÷±≤≥≠≈∫∑∏√π∞]", 0.15),
            // Numbers and arithmetic shapes
            wp(r"\d", 0.1),
            wp(r"\d+\s*[+\-*/^×÷%]\s*\d+", 0.3),
            wp(r"^\s*\d+\s*[+\-*/×÷]\s*\d+\s*$", 0.5),
            // Named functions
            wp(r"\b(sin|cos|tan|log|ln|exp|sqrt|abs|floor|ceil|round)\b", 0.2),
            wp(r"\b(sum|integral|derivative|limit|factorial|permutation|combination)\b", 0.4),
            // Advanced terms
            wp(r"\b(laplace|fourier|transform|tensor)\b", 0.4),
            wp(r"\b(eigenvalue|eigenvector|determinant|inverse|transpose|orthogonal)\b", 0.4),
            wp(r"\b(convergence|divergence|series|sequence|continuity|differentiable)\b", 0.3),
            // Algebraic and geometric terms
            wp(r"\b(polynomial|quadratic|linear|exponential|logarithmic|rational|irrational)\b", 0.2),
            wp(r"\b(area|volume|perimeter|circumference|radius|diameter|angle|triangle|circle|square|rectangle)\b", 0.2),
            wp(r"\b(mean|median|mode|variance|deviation|correlation)\b", 0.2),
            // Variables in equations (x=, 2x+, ...)
            wp(r"\b[a-z]\s*[=+\-*/^]", 0.3),
            wp(r"\b\d+[a-z]\s*[+\-*/^=]", 0.3),
            // "What is 2+2" phrasing
            wp(r"\b(what\s+is|how\s+much\s+is)\s+\d", 0.2),
            // Fractions, decimals, percentages
            wp(r"\d+/\d+", 0.2),
            wp(r"\d+\.\d+", 0.1),
            wp(r"\d+\s*%|\bpercent\b", 0.2),
            // Units that often appear in math problems
            wp(r"\b(degrees?|radians?|meters?|feet|inches?|cm|mm|kg|grams?|seconds?|minutes?|hours?)\b", 0.1),
        ];

        Self {
            accept_threshold: config.accept_threshold,
            max_question_len: config.max_question_len,
            unsafe_patterns,
            negative_patterns,
            positive_patterns,
        }
    }

    /// Classify a question. Deterministic; never fails for well-formed text.
    pub fn classify(&self, text: &str) -> ClassificationVerdict {
        let trimmed = text.trim();

        if trimmed.is_empty() {
            return ClassificationVerdict::rejected(0.0, RejectionReason::EmptyInput);
        }

        if trimmed.chars().count() > self.max_question_len {
            return ClassificationVerdict::rejected(0.0, RejectionReason::TooLong);
        }

        let lower = trimmed.to_lowercase();

        for pattern in &self.unsafe_patterns {
            if pattern.is_match(&lower) {
                return ClassificationVerdict::rejected(0.0, RejectionReason::UnsafeContent);
            }
        }

        // Negative indicators dominate positive ones
        for pattern in &self.negative_patterns {
            if pattern.is_match(&lower) {
                return ClassificationVerdict::rejected(0.0, RejectionReason::NonMathematical);
            }
        }

        let score = self.math_score(&lower);
        if score >= self.accept_threshold {
            ClassificationVerdict::accepted(score)
        } else {
            ClassificationVerdict::rejected(score, RejectionReason::NonMathematical)
        }
    }

    /// Accumulate bounded weights from positive indicators, saturating at 1.0
    fn math_score(&self, lower: &str) -> f32 {
        let mut score = 0.0f32;
        for wp in &self.positive_patterns {
            if wp.pattern.is_match(lower) {
                score += wp.weight;
            }
        }
        score.min(1.0)
    }
}

fn wp(pattern: &str, weight: f32) -> WeightedPattern {
    WeightedPattern {
        pattern: Regex::new(pattern).expect("invalid classifier pattern"),
        weight,
    }
}
