//! Application configuration
//!
//! Layered with the `config` crate: serde defaults, then an optional TOML
//! file, then `TODO_API__*` environment variables.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{logging::LoggingConfig, telemetry::TelemetryConfig};

/// Environment variable naming an alternative configuration file
pub const CONFIG_PATH_ENV: &str = "TODO_API_CONFIG";

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "TODO_API";

/// Separator between prefix and nested keys, e.g. `TODO_API__SERVER__PORT`
pub const ENV_SEPARATOR: &str = "__";

const DEFAULT_CONFIG_FILE: &str = "config";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Identity stamped on every log record, metric and trace
    #[serde(default)]
    pub app: AppIdentity,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Log sinks and filtering
    #[serde(default)]
    pub logging: LoggingConfig,

    /// OpenTelemetry export
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Who is emitting logs and telemetry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppIdentity {
    /// Application identifier
    #[serde(default = "default_app_id")]
    pub id: String,

    /// Human-readable application name, also the OpenTelemetry service name
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Deployment environment name, e.g. "Local" or "Production"
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_app_id() -> String {
    "1234".to_string()
}

fn default_app_name() -> String {
    "Todo Sample API".to_string()
}

fn default_environment() -> String {
    "Local".to_string()
}

impl Default for AppIdentity {
    fn default() -> Self {
        Self {
            id: default_app_id(),
            name: default_app_name(),
            environment: default_environment(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Graceful shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Serve Swagger UI and the OpenAPI document
    #[serde(default = "default_true")]
    pub api_docs_enabled: bool,

    /// CORS origins; empty allows any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_shutdown_timeout() -> u64 {
    30
}

const fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            api_docs_enabled: true,
            allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string for binding
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl AppConfig {
    /// Load configuration from environment and optional file
    ///
    /// The file is `config.toml` in the working directory unless
    /// `TODO_API_CONFIG` names another one. A missing file is not an error.
    pub fn load() -> Result<Self, config::ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::build(config::File::with_name(&path).required(false), None)
    }

    /// Parse configuration from a TOML document, applying defaults
    pub fn from_toml(toml: &str) -> Result<Self, config::ConfigError> {
        Self::build(
            config::File::from_str(toml, config::FileFormat::Toml),
            Some(HashMap::new()),
        )
    }

    /// Parse a TOML document and then apply the given variables as if they
    /// came from the process environment
    pub fn from_toml_with_env(
        toml: &str,
        env: HashMap<String, String>,
    ) -> Result<Self, config::ConfigError> {
        Self::build(
            config::File::from_str(toml, config::FileFormat::Toml),
            Some(env),
        )
    }

    fn build<S>(
        file: S,
        env_override: Option<HashMap<String, String>>,
    ) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(file)
            // Override with environment variables (e.g., TODO_API__SERVER__PORT)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true)
                    .source(env_override),
            );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.server.api_docs_enabled);
        assert_eq!(config.app.id, "1234");
        assert_eq!(config.app.name, "Todo Sample API");
        assert_eq!(config.app.environment, "Local");
    }

    #[test]
    fn bind_address_joins_host_and_port() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            ..ServerConfig::default()
        };
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.app.environment, "Local");
        assert!(config.logging.loki.enabled);
        assert!(config.telemetry.enabled);
    }

    #[test]
    fn toml_overrides_defaults() {
        let toml = r#"
            [app]
            id = "42"
            name = "Todo API"
            environment = "Staging"

            [server]
            port = 8081

            [logging.loki]
            endpoint = "http://loki:3100"
            enabled = false

            [telemetry]
            endpoint = "http://collector:4317"
        "#;
        let config = AppConfig::from_toml(toml).unwrap();

        assert_eq!(config.app.id, "42");
        assert_eq!(config.app.name, "Todo API");
        assert_eq!(config.app.environment, "Staging");
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.logging.loki.endpoint, "http://loki:3100");
        assert!(!config.logging.loki.enabled);
        assert_eq!(config.telemetry.endpoint, "http://collector:4317");
    }

    #[test]
    fn environment_overrides_file() {
        let env = HashMap::from([
            ("TODO_API__SERVER__PORT".to_string(), "9090".to_string()),
            ("TODO_API__APP__ENVIRONMENT".to_string(), "Production".to_string()),
        ]);
        let config = AppConfig::from_toml_with_env("[server]\nport = 8081\n", env).unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.app.environment, "Production");
    }

    #[test]
    fn invalid_port_is_rejected() {
        let result = AppConfig::from_toml("[server]\nport = \"not a port\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn app_config_serialization() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("server"));
        assert!(json.contains("logging"));
        assert!(json.contains("telemetry"));
    }
}
