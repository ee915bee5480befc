//! Metrics and observability utilities
//!
//! Provides Prometheus-style metrics for pipeline stages with
//! standardized naming conventions.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all ScholarNet metrics
pub const METRICS_PREFIX: &str = "scholarnet";

/// Buckets for stage latency (in seconds); batch stages range from
/// sub-millisecond joins to multi-second model comparisons
pub const STAGE_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.010,  // 10ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
    30.00,  // 30s
    60.00,  // 1m
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Stage metrics
    describe_histogram!(
        format!("{}_stage_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Pipeline stage latency in seconds"
    );

    // Input metrics
    describe_counter!(
        format!("{}_records_loaded_total", METRICS_PREFIX),
        Unit::Count,
        "Publication records read from the collector output"
    );

    describe_counter!(
        format!("{}_records_dropped_total", METRICS_PREFIX),
        Unit::Count,
        "Publication records removed during cleaning"
    );

    // Graph metrics
    describe_gauge!(
        format!("{}_graph_nodes", METRICS_PREFIX),
        Unit::Count,
        "Authors in the collaboration graph"
    );

    describe_gauge!(
        format!("{}_graph_edges", METRICS_PREFIX),
        Unit::Count,
        "Co-authorship edges in the collaboration graph"
    );

    describe_gauge!(
        format!("{}_communities", METRICS_PREFIX),
        Unit::Count,
        "Communities found in the collaboration graph"
    );

    describe_counter!(
        format!("{}_eigenvector_fallbacks_total", METRICS_PREFIX),
        Unit::Count,
        "Eigenvector centrality runs that fell back to zero after retry"
    );

    // Model metrics
    describe_counter!(
        format!("{}_model_fits_total", METRICS_PREFIX),
        Unit::Count,
        "Citation model fits by outcome"
    );

    describe_gauge!(
        format!("{}_model_r2_score", METRICS_PREFIX),
        Unit::Count,
        "Held-out coefficient of determination per model"
    );

    // Output metrics
    describe_counter!(
        format!("{}_rows_written_total", METRICS_PREFIX),
        Unit::Count,
        "Rows written to output tables"
    );

    tracing::debug!("Metrics registered");
}

/// Helper to record stage timing
pub struct StageTimer {
    start: Instant,
    stage: &'static str,
}

impl StageTimer {
    /// Start tracking a stage
    pub fn start(stage: &'static str) -> Self {
        Self {
            start: Instant::now(),
            stage,
        }
    }

    /// Record stage completion, returning the elapsed seconds
    pub fn finish(self) -> f64 {
        let duration = self.start.elapsed().as_secs_f64();

        histogram!(
            format!("{}_stage_duration_seconds", METRICS_PREFIX),
            "stage" => self.stage
        )
        .record(duration);

        duration
    }
}

/// Helper to record input cleaning
pub fn record_records(loaded: usize, dropped: usize) {
    counter!(format!("{}_records_loaded_total", METRICS_PREFIX)).increment(loaded as u64);
    counter!(format!("{}_records_dropped_total", METRICS_PREFIX)).increment(dropped as u64);
}

/// Helper to record graph size
pub fn record_graph(nodes: usize, edges: usize) {
    gauge!(format!("{}_graph_nodes", METRICS_PREFIX)).set(nodes as f64);
    gauge!(format!("{}_graph_edges", METRICS_PREFIX)).set(edges as f64);
}

/// Helper to record community count
pub fn record_communities(count: usize, algorithm: &str) {
    gauge!(
        format!("{}_communities", METRICS_PREFIX),
        "algorithm" => algorithm.to_string()
    )
    .set(count as f64);
}

/// Helper to record an eigenvector centrality fallback
pub fn record_eigenvector_fallback() {
    counter!(format!("{}_eigenvector_fallbacks_total", METRICS_PREFIX)).increment(1);
}

/// Helper to record a model fit outcome
pub fn record_model_fit(model: &str, r2_score: Option<f64>) {
    let status = if r2_score.is_some() { "success" } else { "error" };

    counter!(
        format!("{}_model_fits_total", METRICS_PREFIX),
        "model" => model.to_string(),
        "status" => status
    )
    .increment(1);

    if let Some(r2) = r2_score {
        gauge!(
            format!("{}_model_r2_score", METRICS_PREFIX),
            "model" => model.to_string()
        )
        .set(r2);
    }
}

/// Helper to record output rows
pub fn record_rows_written(table: &str, rows: usize) {
    counter!(
        format!("{}_rows_written_total", METRICS_PREFIX),
        "table" => table.to_string()
    )
    .increment(rows as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_buckets() {
        // Verify buckets are sorted
        let mut prev = 0.0;
        for &bucket in STAGE_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }
    }

    #[test]
    fn test_stage_timer() {
        let timer = StageTimer::start("graph");
        std::thread::sleep(std::time::Duration::from_millis(5));
        let elapsed = timer.finish();
        assert!(elapsed > 0.0);
    }

    #[test]
    fn test_helpers_without_recorder() {
        // No recorder installed: the facade must be a no-op
        record_records(10, 2);
        record_graph(5, 4);
        record_model_fit("single_tree", Some(0.5));
        record_model_fit("boosted_trees", None);
    }
}
