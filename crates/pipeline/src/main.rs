//! ScholarNet Pipeline
//!
//! Batch analysis of a publication export:
//! 1. Loads and cleans publication records
//! 2. Builds the co-authorship graph and its metrics
//! 3. Detects communities and scores author influence
//! 4. Compares citation models and clusters authors
//! 5. Writes result tables and a run manifest
//!
//! Usage: `pipeline [INPUT]` (defaults to `paths.input`)

mod loader;
mod runner;
mod writer;

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use scholarnet_common::{
    config::{AppConfig, ObservabilityConfig},
    metrics::{register_metrics, METRICS_PREFIX, STAGE_BUCKETS},
    VERSION,
};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(&ObservabilityConfig::default());
            tracing::error!(error = %e, code = e.code().as_code(), "Failed to load configuration");
            return Err(e.into());
        }
    };

    init_tracing(&config.observability);
    let _root = root_span(&config.observability).entered();
    info!("Starting ScholarNet Pipeline v{}", VERSION);

    let metrics_handle = if config.observability.metrics_snapshot {
        Some(install_metrics()?)
    } else {
        None
    };
    register_metrics();

    let input = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.paths.input.clone());

    let records = loader::load_publications(&input).map_err(|e| {
        tracing::error!(
            error = %e,
            code = e.code().as_code(),
            input_error = e.is_input_error(),
            path = %input,
            "Failed to load publications"
        );
        e
    })?;

    let output = runner::run(&records, &config);

    let results_dir = Path::new(&config.paths.results_dir);
    writer::OutputBundle::render(&output)?.write_to(results_dir)?;

    if let Some(handle) = metrics_handle {
        writer::write_file(
            &results_dir.join(writer::METRICS_SNAPSHOT),
            handle.render().as_bytes(),
        )?;
    }

    info!(
        records = output.records_loaded,
        authors = output.features.len(),
        communities = output.partition.community_count(),
        best_model = output.prediction.best_model.map_or("none", |m| m.name()),
        results_dir = %results_dir.display(),
        "Pipeline finished"
    );
    Ok(())
}

fn init_tracing(observability: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&observability.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if observability.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Span entered for the whole run so every log line names the service
fn root_span(observability: &ObservabilityConfig) -> tracing::Span {
    tracing::info_span!("pipeline", service = %observability.service_name)
}

fn install_metrics() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(format!("{}_stage_duration_seconds", METRICS_PREFIX)),
            STAGE_BUCKETS,
        )?
        .install_recorder()?;
    Ok(handle)
}
