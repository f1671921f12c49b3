//! HTTP middleware components

pub mod http_metrics;
pub mod trace;

pub use http_metrics::{HttpMetricsLayer, HttpMetricsService};
pub use trace::{HttpTraceLayer, http_trace_layer};
