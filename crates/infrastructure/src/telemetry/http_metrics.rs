//! HTTP request metrics
//!
//! Records request count and latency twice: through the `metrics` facade for
//! the Prometheus scrape endpoint, and through the OpenTelemetry global meter
//! for OTLP push. Without an installed provider either side is a no-op.

use std::{fmt, time::Duration};

use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};

use super::names;

/// Instrumentation scope of the OpenTelemetry instruments
pub const METER_NAME: &str = "todo_api";

/// Request counter and latency histogram
#[derive(Clone)]
pub struct HttpMetrics {
    requests: Counter<u64>,
    duration: Histogram<f64>,
}

impl fmt::Debug for HttpMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMetrics").finish_non_exhaustive()
    }
}

impl Default for HttpMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpMetrics {
    /// Create instruments on the current global meter provider
    ///
    /// Call after telemetry is initialized, otherwise the OTLP side stays a no-op.
    pub fn new() -> Self {
        let meter = global::meter(METER_NAME);
        Self {
            requests: meter
                .u64_counter(names::OTEL_HTTP_REQUESTS)
                .with_description("Number of HTTP requests handled")
                .build(),
            duration: meter
                .f64_histogram(names::OTEL_HTTP_REQUEST_DURATION)
                .with_description("Duration of HTTP requests")
                .with_unit("s")
                .build(),
        }
    }

    /// Record one completed request
    pub fn record(&self, method: &str, route: &str, status: u16, elapsed: Duration) {
        let seconds = elapsed.as_secs_f64();

        metrics::counter!(
            names::HTTP_REQUESTS_TOTAL,
            "method" => method.to_string(),
            "route" => route.to_string(),
            "status" => status.to_string()
        )
        .increment(1);
        metrics::histogram!(
            names::HTTP_REQUEST_DURATION_SECONDS,
            "method" => method.to_string(),
            "route" => route.to_string(),
            "status" => status.to_string()
        )
        .record(seconds);

        let attributes = [
            KeyValue::new("http.request.method", method.to_string()),
            KeyValue::new("http.route", route.to_string()),
            KeyValue::new("http.response.status_code", i64::from(status)),
        ];
        self.requests.add(1, &attributes);
        self.duration.record(seconds, &attributes);
    }
}
