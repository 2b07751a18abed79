//! Prometheus metrics for the conversion engine.
//!
//! Nothing is registered by default; callers that expose metrics add
//! [`all_metrics`] to their own registry.

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Files
// =============================================================================

/// Files handled total by outcome.
pub static FILES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("speedupper_files_total", "Total input files handled"),
        &["outcome"], // "converted", "failed", "skipped"
    )
    .expect("valid metric definition")
});

/// Transcode duration in seconds.
pub static TRANSCODE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "speedupper_transcode_duration_seconds",
            "Duration of a single transcoder invocation",
        )
        .buckets(vec![0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 300.0, 900.0, 3600.0]),
        &["result"], // "success", "failure"
    )
    .expect("valid metric definition")
});

/// Failed attempts to copy a converted file over its source.
pub static REPLACE_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "speedupper_replace_failures_total",
        "Total replace-original copies that failed",
    )
    .expect("valid metric definition")
});

// =============================================================================
// Runs
// =============================================================================

/// Finished runs by mode and how they ended.
pub static RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("speedupper_runs_total", "Total runs finished"),
        &["mode", "result"], // result: "completed", "preview_ready", "preview_failed", "cancelled"
    )
    .expect("valid metric definition")
});

/// Get all engine metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(FILES_TOTAL.clone()),
        Box::new(TRANSCODE_DURATION.clone()),
        Box::new(REPLACE_FAILURES.clone()),
        Box::new(RUNS_TOTAL.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Registry;

    #[test]
    fn test_all_metrics_register() {
        let registry = Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }

        FILES_TOTAL.with_label_values(&["converted"]).inc();
        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"speedupper_files_total".to_string()));
    }
}
