//! Metrics and observability utilities
//!
//! Provides Prometheus metrics for the resolution pipeline with
//! standardized naming conventions.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};

/// Metrics prefix for all MathAgent metrics
pub const METRICS_PREFIX: &str = "mathagent";

/// Register all metric descriptions
pub fn register_metrics() {
    // Resolution metrics
    describe_counter!(
        format!("{}_resolve_total", METRICS_PREFIX),
        Unit::Count,
        "Total questions entering the resolution pipeline"
    );

    describe_histogram!(
        format!("{}_resolve_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "End-to-end resolution latency in seconds"
    );

    describe_counter!(
        format!("{}_rejections_total", METRICS_PREFIX),
        Unit::Count,
        "Questions rejected by the classifier"
    );

    // Augmentation metrics
    describe_counter!(
        format!("{}_search_augmentations_total", METRICS_PREFIX),
        Unit::Count,
        "Web searches triggered by low retrieval confidence"
    );

    // Synthesis metrics
    describe_counter!(
        format!("{}_fallback_answers_total", METRICS_PREFIX),
        Unit::Count,
        "Answers produced by the deterministic fallback"
    );

    tracing::info!("Metrics registered");
}

/// Record a completed resolution
pub fn record_resolve(duration_secs: f64, used_web_search: bool, used_primary_model: bool) {
    counter!(
        format!("{}_resolve_total", METRICS_PREFIX),
        "web_search" => used_web_search.to_string()
    )
    .increment(1);

    histogram!(format!("{}_resolve_duration_seconds", METRICS_PREFIX)).record(duration_secs);

    if !used_primary_model {
        counter!(format!("{}_fallback_answers_total", METRICS_PREFIX)).increment(1);
    }
}

/// Record a classifier rejection
pub fn record_rejection(reason: &str) {
    counter!(
        format!("{}_rejections_total", METRICS_PREFIX),
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Record a triggered search augmentation
pub fn record_augmentation(provider_succeeded: bool, result_count: usize) {
    counter!(
        format!("{}_search_augmentations_total", METRICS_PREFIX),
        "succeeded" => provider_succeeded.to_string(),
        "nonempty" => (result_count > 0).to_string()
    )
    .increment(1);
}
