//! Process-wide logging and telemetry bootstrap
//!
//! Assembles one `tracing` subscriber from the console formatter, the optional
//! Loki layer and the optional OpenTelemetry trace bridge.

use std::{sync::Arc, time::Duration};

use opentelemetry::trace::TracerProvider as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::AppConfig,
    logging::{
        ApplicationEnricher, ConsoleTemplate, EnrichedFormat, LoggingError, LokiHandle, spawn_loki,
    },
    telemetry::{TelemetryError, TelemetryGuard, build_providers},
};

/// Error type for observability bootstrap
#[derive(Debug, thiserror::Error)]
pub enum ObservabilityError {
    /// OTLP exporters could not be built
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// The Loki sink could not be started
    #[error(transparent)]
    Logging(#[from] LoggingError),

    /// A global subscriber is already installed
    #[error("Failed to install tracing subscriber: {0}")]
    Subscriber(String),
}

/// Keeps the log shipper and telemetry providers alive
///
/// Call [`ObservabilityGuard::shutdown`] before exit so queued logs and
/// spans are flushed.
#[derive(Debug)]
pub struct ObservabilityGuard {
    loki: Option<LokiHandle>,
    telemetry: TelemetryGuard,
}

impl ObservabilityGuard {
    /// Whether logs are shipped to Loki
    pub const fn loki_active(&self) -> bool {
        self.loki.is_some()
    }

    /// Whether traces and metrics are exported over OTLP
    pub const fn telemetry_active(&self) -> bool {
        self.telemetry.is_active()
    }

    /// Flush Loki, then shut down the OTLP providers
    pub async fn shutdown(self, timeout: Duration) {
        if let Some(loki) = self.loki {
            loki.shutdown(timeout).await;
        }
        drop(self.telemetry);
    }
}

/// Install the global subscriber
///
/// Must be called once, from within a Tokio runtime. Failing exporters are
/// skipped with a warning when `telemetry.graceful_fallback` is set.
pub fn init_observability(config: &AppConfig) -> Result<ObservabilityGuard, ObservabilityError> {
    let enricher = Arc::new(ApplicationEnricher::from_identity(&config.app));
    let mut fallbacks = Vec::new();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));

    let console_layer = tracing_subscriber::fmt::layer().event_format(EnrichedFormat::new(
        ConsoleTemplate::parse(&config.logging.console_template),
        Arc::clone(&enricher),
    ));

    let (loki_layer, loki_handle) = if config.logging.loki.enabled {
        match spawn_loki(&config.logging.loki, Arc::clone(&enricher)) {
            Ok((layer, handle)) => (Some(layer), Some(handle)),
            Err(e) if config.telemetry.graceful_fallback => {
                fallbacks.push(format!("Loki sink disabled: {e}"));
                (None, None)
            },
            Err(e) => return Err(e.into()),
        }
    } else {
        (None, None)
    };

    let providers = if config.telemetry.enabled {
        match build_providers(&config.telemetry, &config.app) {
            Ok(providers) => Some(providers),
            Err(e) if config.telemetry.graceful_fallback => {
                fallbacks.push(format!("OTLP export disabled: {e}"));
                None
            },
            Err(e) => return Err(e.into()),
        }
    } else {
        None
    };

    let otel_layer = providers.as_ref().map(|p| {
        tracing_opentelemetry::layer().with_tracer(p.tracer_provider.tracer(config.app.name.clone()))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(loki_layer)
        .with(otel_layer)
        .try_init()
        .map_err(|e| ObservabilityError::Subscriber(e.to_string()))?;

    for reason in &fallbacks {
        warn!(reason = %reason, "Continuing with reduced observability");
    }

    let guard = ObservabilityGuard {
        loki: loki_handle,
        telemetry: TelemetryGuard::new(providers),
    };

    info!(
        loki = guard.loki_active(),
        otlp = guard.telemetry_active(),
        endpoint = %config.telemetry.endpoint,
        "Observability initialized"
    );

    Ok(guard)
}
