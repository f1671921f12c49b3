//! Application state shared across handlers

use std::sync::Arc;

use application::TodoService;
use infrastructure::{AppConfig, HttpMetrics};
use metrics_exporter_prometheus::PrometheusHandle;

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Todo use cases
    pub todos: Arc<TodoService>,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Renders the Prometheus scrape output
    pub prometheus: PrometheusHandle,
    /// Request count and latency instruments
    pub http_metrics: HttpMetrics,
}

impl AppState {
    /// Build state; OTLP instruments are taken from the current global meter provider
    pub fn new(todos: TodoService, config: AppConfig, prometheus: PrometheusHandle) -> Self {
        Self {
            todos: Arc::new(todos),
            config: Arc::new(config),
            prometheus,
            http_metrics: HttpMetrics::new(),
        }
    }
}
