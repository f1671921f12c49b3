//! Application log enricher
//!
//! Stamps every log record with the application id, application name and
//! environment name. Values already present on a record win.

use crate::config::AppIdentity;

use super::record::LogRecord;

/// Property key for the application id
pub const APPLICATION_ID: &str = "application_id";
/// Property key for the application name
pub const APPLICATION_NAME: &str = "application_name";
/// Property key for the environment name
pub const ENVIRONMENT: &str = "environment";

/// Adds fixed application properties to log records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationEnricher {
    application_id: String,
    application_name: String,
    environment: String,
}

impl ApplicationEnricher {
    /// Create an enricher with fixed values
    pub fn new(
        application_id: impl Into<String>,
        application_name: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            application_id: application_id.into(),
            application_name: application_name.into(),
            environment: environment.into(),
        }
    }

    /// Create an enricher from the configured identity
    pub fn from_identity(identity: &AppIdentity) -> Self {
        Self::new(&identity.id, &identity.name, &identity.environment)
    }

    /// Add the application properties that are not already on the record
    pub fn enrich(&self, record: &mut LogRecord) {
        record.add_property_if_absent(APPLICATION_ID, &self.application_id);
        record.add_property_if_absent(APPLICATION_NAME, &self.application_name);
        record.add_property_if_absent(ENVIRONMENT, &self.environment);
    }

    /// Application id
    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    /// Application name
    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    /// Environment name
    pub fn environment(&self) -> &str {
        &self.environment
    }
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::*;

    fn enricher() -> ApplicationEnricher {
        ApplicationEnricher::new("1234", "Todo Sample API", "Local")
    }

    #[test]
    fn adds_all_three_properties() {
        let mut record = LogRecord::new(Level::INFO, "test", "hello");
        enricher().enrich(&mut record);

        assert_eq!(record.property(APPLICATION_ID), Some("1234"));
        assert_eq!(record.property(APPLICATION_NAME), Some("Todo Sample API"));
        assert_eq!(record.property(ENVIRONMENT), Some("Local"));
    }

    #[test]
    fn never_overwrites_existing_values() {
        let mut record = LogRecord::new(Level::INFO, "test", "hello");
        record.add_property_if_absent(ENVIRONMENT, "Canary");

        enricher().enrich(&mut record);

        assert_eq!(record.property(ENVIRONMENT), Some("Canary"));
        assert_eq!(record.property(APPLICATION_ID), Some("1234"));
    }

    #[test]
    fn enriching_twice_is_idempotent() {
        let mut record = LogRecord::new(Level::INFO, "test", "hello");
        enricher().enrich(&mut record);
        let once = record.clone();

        ApplicationEnricher::new("other", "other", "other").enrich(&mut record);

        assert_eq!(record, once);
    }

    #[test]
    fn from_identity_uses_config_values() {
        let identity = AppIdentity {
            id: "7".to_string(),
            name: "Todo".to_string(),
            environment: "Test".to_string(),
        };
        let enricher = ApplicationEnricher::from_identity(&identity);
        assert_eq!(enricher.application_id(), "7");
        assert_eq!(enricher.application_name(), "Todo");
        assert_eq!(enricher.environment(), "Test");
    }
}
