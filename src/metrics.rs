//! Metrics and observability utilities
//!
//! Prometheus counters with standardized naming; the recorder handle is
//! exposed on the router at `GET /metrics`.

use metrics::{describe_counter, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::errors::{AppError, Result};

/// Metrics prefix for all toxtrack metrics
pub const METRICS_PREFIX: &str = "toxtrack";

/// Install the global Prometheus recorder and return its render handle
pub fn install_recorder() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| AppError::Configuration {
            message: format!("failed to install metrics recorder: {e}"),
        })
}

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_studies_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of studies created"
    );

    describe_counter!(
        format!("{}_animal_models_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of animal models created"
    );

    describe_counter!(
        format!("{}_dose_groups_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of dose groups created"
    );

    describe_counter!(
        format!("{}_outcomes_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of outcomes created"
    );

    describe_counter!(
        format!("{}_metadata_rows_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of metadata rows written"
    );

    describe_counter!(
        format!("{}_exports_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of study CSV exports served"
    );
}
