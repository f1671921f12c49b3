//! Infrastructure layer - Adapters and process bootstrap
//!
//! Implements the ports defined in the application layer and wires up
//! configuration, logging and telemetry.

pub mod config;
pub mod logging;
pub mod observability;
pub mod persistence;
pub mod telemetry;

pub use config::{AppConfig, AppIdentity, ServerConfig};
pub use logging::{ApplicationEnricher, LoggingConfig, LokiConfig};
pub use observability::{ObservabilityError, ObservabilityGuard, init_observability};
pub use persistence::InMemoryTodoStore;
pub use telemetry::{
    HttpMetrics, TelemetryConfig, TelemetryError, TelemetryGuard, install_prometheus_recorder,
};
