//! Structured view of a `tracing` event

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Local};
use serde_json::{Map, Value};
use tracing::{
    Event, Level,
    field::{Field, Visit},
};

/// A log event flattened into a message and named string properties
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// When the event was recorded
    pub timestamp: DateTime<Local>,
    /// Severity
    pub level: Level,
    /// Module path or explicit target of the event
    pub target: String,
    /// Rendered `message` field
    pub message: String,
    /// Every other field, keyed by name
    pub properties: BTreeMap<String, String>,
}

impl LogRecord {
    /// Create a record without properties, stamped now
    pub fn new(level: Level, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            target: target.into(),
            message: message.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Collect the fields of a `tracing` event
    pub fn from_event(event: &Event<'_>) -> Self {
        let metadata = event.metadata();
        let mut record = Self::new(*metadata.level(), metadata.target(), String::new());
        event.record(&mut FieldCollector(&mut record));
        record
    }

    /// Add a property unless one with the same key is already present
    ///
    /// Returns `true` if the property was added.
    pub fn add_property_if_absent(&mut self, key: &str, value: &str) -> bool {
        if self.properties.contains_key(key) {
            return false;
        }
        self.properties.insert(key.to_string(), value.to_string());
        true
    }

    /// Look up a property
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Three-letter upper-case severity, e.g. `INF`
    pub const fn level_abbreviation(&self) -> &'static str {
        match self.level {
            Level::TRACE => "TRC",
            Level::DEBUG => "DBG",
            Level::INFO => "INF",
            Level::WARN => "WRN",
            _ => "ERR",
        }
    }

    /// Lower-case severity name, e.g. `info`
    pub const fn level_name(&self) -> &'static str {
        match self.level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            _ => "error",
        }
    }

    /// JSON object with level, target, message and all properties
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("level".to_string(), Value::from(self.level_name()));
        object.insert("target".to_string(), Value::from(self.target.as_str()));
        object.insert("message".to_string(), Value::from(self.message.as_str()));
        for (key, value) in &self.properties {
            object
                .entry(key.clone())
                .or_insert_with(|| Value::from(value.as_str()));
        }
        Value::Object(object)
    }
}

struct FieldCollector<'a>(&'a mut LogRecord);

impl Visit for FieldCollector<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.0.message = value.to_string();
        } else {
            self.0
                .properties
                .insert(field.name().to_string(), value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0.message = format!("{value:?}");
        } else {
            self.0
                .properties
                .insert(field.name().to_string(), format!("{value:?}"));
        }
    }
}
