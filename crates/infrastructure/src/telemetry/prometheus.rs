//! Prometheus scrape support
//!
//! Metrics recorded through the `metrics` facade are kept by a
//! `metrics-exporter-prometheus` recorder and rendered on demand by the
//! `/metrics` endpoint.

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};

use super::{TelemetryError, names};
use crate::config::AppIdentity;

/// Histogram buckets for request latency, in seconds
const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Build a recorder labelled with the application identity
///
/// The recorder is not installed; see [`install_prometheus_recorder`].
pub fn build_prometheus_recorder(
    identity: &AppIdentity,
) -> Result<PrometheusRecorder, TelemetryError> {
    let recorder = PrometheusBuilder::new()
        .add_global_label("env", identity.environment.clone())
        .add_global_label("app_id", identity.id.clone())
        .add_global_label("app_name", identity.name.clone())
        .set_buckets_for_metric(
            Matcher::Full(names::HTTP_REQUEST_DURATION_SECONDS.to_string()),
            LATENCY_BUCKETS,
        )
        .map_err(|e| TelemetryError::Metrics(e.to_string()))?
        .build_recorder();

    Ok(recorder)
}

/// Install the Prometheus recorder as the global `metrics` recorder
///
/// Returns the handle used to render the scrape output. Fails if a global
/// recorder is already installed.
pub fn install_prometheus_recorder(
    identity: &AppIdentity,
) -> Result<PrometheusHandle, TelemetryError> {
    let recorder = build_prometheus_recorder(identity)?;
    let handle = recorder.handle();

    metrics::set_global_recorder(recorder).map_err(|_| {
        TelemetryError::Metrics("a global metrics recorder is already installed".to_string())
    })?;

    Ok(handle)
}
