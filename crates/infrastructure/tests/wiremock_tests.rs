//! Integration tests for infrastructure crate
//!
//! Tests cover:
//! - Loki push from a configured logging pipeline, against wiremock
//! - Configuration handling

use std::{collections::HashMap, sync::Arc, time::Duration};

use infrastructure::{
    AppConfig, ApplicationEnricher,
    logging::{ConsoleTemplate, LogRecord, spawn_loki},
};
use tracing_subscriber::layer::SubscriberExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Loki Push Tests
// ============================================================================

mod loki_push_tests {
    use super::*;

    async fn mock_loki() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/loki/api/v1/push"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn configured_identity_reaches_loki_labels() {
        let server = mock_loki().await;
        let config = AppConfig::from_toml(&format!(
            r#"
            [app]
            id = "42"
            name = "Todo Test"
            environment = "Staging"

            [logging.loki]
            endpoint = "{}"
            flush_interval_ms = 60000
            "#,
            server.uri()
        ))
        .expect("valid config");

        let enricher = Arc::new(ApplicationEnricher::from_identity(&config.app));
        let (layer, handle) = spawn_loki(&config.logging.loki, enricher).expect("spawn");

        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("Get all todo items");
            tracing::warn!("Something odd");
        });
        handle.shutdown(Duration::from_secs(5)).await;

        let requests = server.received_requests().await.expect("recording enabled");
        assert_eq!(requests.len(), 1);

        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).expect("json body");
        let streams = body["streams"].as_array().expect("streams");
        assert_eq!(streams.len(), 2);
        for stream in streams {
            assert_eq!(stream["stream"]["appId"], "42");
            assert_eq!(stream["stream"]["appName"], "Todo Test");
            assert_eq!(stream["stream"]["env"], "Staging");
        }
    }

    #[tokio::test]
    async fn event_field_is_not_overwritten_by_enrichment() {
        let server = mock_loki().await;
        let mut config = AppConfig::default();
        config.logging.loki.endpoint = server.uri();

        let enricher = Arc::new(ApplicationEnricher::from_identity(&config.app));
        let (layer, handle) = spawn_loki(&config.logging.loki, enricher).expect("spawn");

        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(environment = "Override", "Add a todo item");
        });
        handle.shutdown(Duration::from_secs(5)).await;

        let requests = server.received_requests().await.expect("recording enabled");
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).expect("json body");
        let line: serde_json::Value =
            serde_json::from_str(body["streams"][0]["values"][0][1].as_str().expect("line"))
                .expect("json line");

        assert_eq!(line["environment"], "Override");
        assert_eq!(line["application_id"], "1234");
    }

    #[tokio::test]
    async fn unreachable_loki_does_not_block_logging() {
        let mut config = AppConfig::default();
        config.logging.loki.endpoint = "http://127.0.0.1:9".to_string();
        config.logging.loki.push_timeout_secs = 1;

        let enricher = Arc::new(ApplicationEnricher::from_identity(&config.app));
        let (layer, handle) = spawn_loki(&config.logging.loki, enricher).expect("spawn");

        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            for i in 0..10 {
                tracing::info!(i, "event");
            }
        });

        handle.shutdown(Duration::from_secs(5)).await;
    }
}

// ============================================================================
// Configuration Tests
// ============================================================================

mod config_tests {
    use super::*;

    #[test]
    fn env_overrides_logging_and_telemetry() {
        let env = HashMap::from([
            (
                "TODO_API__LOGGING__LOKI__ENABLED".to_string(),
                "false".to_string(),
            ),
            (
                "TODO_API__TELEMETRY__ENDPOINT".to_string(),
                "http://collector:4317".to_string(),
            ),
        ]);

        let config = AppConfig::from_toml_with_env("", env).expect("valid config");

        assert!(!config.logging.loki.enabled);
        assert_eq!(config.telemetry.endpoint, "http://collector:4317");
    }

    #[test]
    fn configured_template_renders_identity() {
        let config = AppConfig::from_toml(
            r#"
            [app]
            id = "7"
            [logging]
            console_template = "[{Level}] {application_id} {Message}"
            "#,
        )
        .expect("valid config");

        let enricher = ApplicationEnricher::from_identity(&config.app);
        let mut record = LogRecord::new(tracing::Level::WARN, "todo", "Delete a todo item");
        enricher.enrich(&mut record);

        let line = ConsoleTemplate::parse(&config.logging.console_template).render(&record);
        assert_eq!(line, "[WRN] 7 Delete a todo item");
    }
}
