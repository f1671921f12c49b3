//! Telemetry: OTLP traces and metrics, Prometheus scrape

mod http_metrics;
mod otel;
mod prometheus;

pub use http_metrics::{HttpMetrics, METER_NAME};
pub use otel::{
    OtelProviders, TelemetryConfig, TelemetryError, TelemetryGuard, build_providers, resource,
};
pub use prometheus::{build_prometheus_recorder, install_prometheus_recorder};

/// Metric names
pub mod names {
    /// Prometheus request counter
    pub const HTTP_REQUESTS_TOTAL: &str = "http_server_requests_total";
    /// Prometheus request latency histogram
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_server_request_duration_seconds";
    /// OpenTelemetry request counter
    pub const OTEL_HTTP_REQUESTS: &str = "http.server.requests";
    /// OpenTelemetry request latency histogram
    pub const OTEL_HTTP_REQUEST_DURATION: &str = "http.server.request.duration";
}
