//! Logging pipeline
//!
//! Every log event goes through the [`ApplicationEnricher`] before it reaches
//! a sink. Two sinks are available: the console, rendered through a
//! [`ConsoleTemplate`], and Loki, shipped by a background worker.

mod enricher;
mod loki;
mod record;
mod template;

use serde::{Deserialize, Serialize};

pub use enricher::{APPLICATION_ID, APPLICATION_NAME, ApplicationEnricher, ENVIRONMENT};
pub use loki::{LokiConfig, LokiHandle, LokiLayer, WORKER_TARGET, spawn_loki};
pub use record::LogRecord;
pub use template::{ConsoleTemplate, DEFAULT_CONSOLE_TEMPLATE, EnrichedFormat};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "presentation_http=debug,tower_http=info");
    /// `RUST_LOG` takes precedence when set
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Console output template
    #[serde(default = "default_console_template")]
    pub console_template: String,

    /// Loki sink
    #[serde(default)]
    pub loki: LokiConfig,
}

fn default_filter() -> String {
    "info".to_string()
}

fn default_console_template() -> String {
    DEFAULT_CONSOLE_TEMPLATE.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            console_template: default_console_template(),
            loki: LokiConfig::default(),
        }
    }
}

/// Error type for logging setup
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// Failed to build the HTTP client used for pushing logs
    #[error("Failed to build log push client: {0}")]
    Client(String),
}
