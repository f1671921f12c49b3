//! OpenTelemetry initialization and configuration
//!
//! Builds the trace and metric providers that export over OTLP/gRPC to a
//! collector. Traces are fed from `tracing` spans; metrics from the global
//! meter provider.

use std::time::Duration;

use opentelemetry::{KeyValue, global};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    metrics::{PeriodicReader, SdkMeterProvider},
    trace::{Sampler, SdkTracerProvider},
};
use serde::{Deserialize, Serialize};

use crate::config::AppIdentity;

/// Configuration for telemetry export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Whether OpenTelemetry export is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// OTLP endpoint URL (e.g., "http://localhost:4317" for gRPC)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Sampling ratio (0.0 - 1.0)
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,

    /// Export timeout in seconds
    #[serde(default = "default_export_timeout")]
    pub export_timeout_secs: u64,

    /// Interval between metric pushes in seconds
    #[serde(default = "default_metrics_interval")]
    pub metrics_interval_secs: u64,

    /// Whether to continue without OTLP export if the exporters can't be built
    ///
    /// When `true` (default), the application keeps running with console and
    /// Loki logging only. Set to `false` to require working exporters.
    #[serde(default = "default_graceful_fallback")]
    pub graceful_fallback: bool,
}

const fn default_enabled() -> bool {
    true
}

fn default_endpoint() -> String {
    "http://localhost:4317".to_string()
}

const fn default_sampling_ratio() -> f64 {
    1.0
}

const fn default_export_timeout() -> u64 {
    10
}

const fn default_metrics_interval() -> u64 {
    15
}

const fn default_graceful_fallback() -> bool {
    true
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_endpoint(),
            sampling_ratio: default_sampling_ratio(),
            export_timeout_secs: default_export_timeout(),
            metrics_interval_secs: default_metrics_interval(),
            graceful_fallback: default_graceful_fallback(),
        }
    }
}

impl TelemetryConfig {
    fn sampler(&self) -> Sampler {
        if (self.sampling_ratio - 1.0).abs() < f64::EPSILON || self.sampling_ratio > 1.0 {
            Sampler::AlwaysOn
        } else if self.sampling_ratio <= 0.0 {
            Sampler::AlwaysOff
        } else {
            Sampler::TraceIdRatioBased(self.sampling_ratio)
        }
    }
}

/// Resource shared by traces and metrics
///
/// `service.name` is the application name; `env`, `appId` and `appName`
/// are attached as attributes.
pub fn resource(identity: &AppIdentity) -> Resource {
    Resource::builder()
        .with_service_name(identity.name.clone())
        .with_attributes([
            KeyValue::new("env", identity.environment.clone()),
            KeyValue::new("appId", identity.id.clone()),
            KeyValue::new("appName", identity.name.clone()),
        ])
        .build()
}

/// Trace and metric providers exporting over OTLP
pub struct OtelProviders {
    /// Provider backing the `tracing` bridge
    pub tracer_provider: SdkTracerProvider,
    /// Provider installed as the global meter provider
    pub meter_provider: SdkMeterProvider,
}

impl std::fmt::Debug for OtelProviders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtelProviders").finish_non_exhaustive()
    }
}

impl OtelProviders {
    /// Flush and stop both providers
    pub fn shutdown(&self) {
        if let Err(e) = self.tracer_provider.shutdown() {
            tracing::error!("Failed to shutdown tracer provider: {:?}", e);
        }
        if let Err(e) = self.meter_provider.shutdown() {
            tracing::error!("Failed to shutdown meter provider: {:?}", e);
        }
    }
}

/// Build OTLP exporters and providers, and install the global meter provider
///
/// Must be called from within a Tokio runtime.
pub fn build_providers(
    config: &TelemetryConfig,
    identity: &AppIdentity,
) -> Result<OtelProviders, TelemetryError> {
    let timeout = Duration::from_secs(config.export_timeout_secs);
    let resource = resource(identity);

    let span_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.endpoint)
        .with_timeout(timeout)
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    let metric_exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(&config.endpoint)
        .with_timeout(timeout)
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    let tracer_provider = SdkTracerProvider::builder()
        .with_batch_exporter(span_exporter)
        .with_sampler(config.sampler())
        .with_resource(resource.clone())
        .build();

    let reader = PeriodicReader::builder(metric_exporter)
        .with_interval(Duration::from_secs(config.metrics_interval_secs.max(1)))
        .build();
    let meter_provider = SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(resource)
        .build();

    global::set_meter_provider(meter_provider.clone());

    Ok(OtelProviders {
        tracer_provider,
        meter_provider,
    })
}

/// Guard that shuts down the providers when dropped
pub struct TelemetryGuard {
    providers: Option<OtelProviders>,
}

impl TelemetryGuard {
    /// Guard over active providers, or an inert guard for `None`
    pub const fn new(providers: Option<OtelProviders>) -> Self {
        Self { providers }
    }

    /// Whether OTLP export is active
    pub const fn is_active(&self) -> bool {
        self.providers.is_some()
    }
}

impl std::fmt::Debug for TelemetryGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryGuard")
            .field("active", &self.providers.is_some())
            .finish_non_exhaustive()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(providers) = self.providers.take() {
            providers.shutdown();
        }
    }
}

/// Error type for telemetry initialization
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to create OTLP exporter
    #[error("Failed to create OTLP exporter: {0}")]
    Exporter(String),

    /// Failed to set up the Prometheus recorder
    #[error("Failed to set up metrics recorder: {0}")]
    Metrics(String),
}
