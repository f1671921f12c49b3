//! Console output template
//!
//! Renders enriched log records through a text template such as
//! `{Timestamp} level=[{Level}] appId={application_id} {Message}`.
//!
//! Placeholders:
//! - `{Timestamp}`: local time, `yyyy-MM-dd HH:mm:ss.fff +zz:zz`
//! - `{Level}`: three-letter severity (`INF`, `WRN`, ...)
//! - `{Message}`: the event message
//! - `{Target}`: the event target
//! - `{Properties}`: properties not named elsewhere in the template, as `key=value`
//! - `{NewLine}`: a line break
//! - `{Exception}`: the `error` property, empty if missing
//! - `{name}`: the property called `name`, empty if missing
//!
//! A `:format` suffix inside a placeholder is accepted and ignored. `{{` and
//! `}}` produce literal braces.

use std::{collections::BTreeSet, fmt, sync::Arc};

use tracing::{Event, Subscriber};
use tracing_subscriber::{
    fmt::{FmtContext, FormatEvent, FormatFields, format::Writer},
    registry::LookupSpan,
};

use super::{enricher::ApplicationEnricher, record::LogRecord};

/// Template used when none is configured
pub const DEFAULT_CONSOLE_TEMPLATE: &str = "{Timestamp} level=[{Level}] appId={application_id} \
     appName={application_name} env={environment} {Message} {Properties}{NewLine}{Exception}";

/// Property rendered by `{Exception}`
const EXCEPTION_PROPERTY: &str = "error";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f %:z";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Timestamp,
    Level,
    Message,
    Target,
    Properties,
    NewLine,
    Property(String),
}

/// A parsed console template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleTemplate {
    segments: Vec<Segment>,
    named: BTreeSet<String>,
}

impl Default for ConsoleTemplate {
    fn default() -> Self {
        Self::parse(DEFAULT_CONSOLE_TEMPLATE)
    }
}

impl ConsoleTemplate {
    /// Parse a template
    ///
    /// Parsing never fails: an unterminated `{` is kept as literal text.
    pub fn parse(template: &str) -> Self {
        let mut segments = Vec::new();
        let mut named = BTreeSet::new();
        let mut literal = String::new();
        let mut rest = template;

        while let Some(c) = rest.chars().next() {
            if rest.starts_with("{{") {
                literal.push('{');
                rest = &rest[2..];
            } else if rest.starts_with("}}") {
                literal.push('}');
                rest = &rest[2..];
            } else if c == '{' {
                let Some(end) = rest.find('}') else {
                    literal.push_str(rest);
                    break;
                };
                let inner = &rest[1..end];
                let name = inner.split(':').next().unwrap_or_default().trim();

                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                let segment = match name {
                    "Timestamp" => Segment::Timestamp,
                    "Level" => Segment::Level,
                    "Message" => Segment::Message,
                    "Target" => Segment::Target,
                    "Properties" => Segment::Properties,
                    "NewLine" => Segment::NewLine,
                    "Exception" => {
                        named.insert(EXCEPTION_PROPERTY.to_string());
                        Segment::Property(EXCEPTION_PROPERTY.to_string())
                    },
                    other => {
                        named.insert(other.to_string());
                        Segment::Property(other.to_string())
                    },
                };
                segments.push(segment);
                rest = &rest[end + 1..];
            } else {
                literal.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self { segments, named }
    }

    /// Render a record; trailing whitespace is trimmed
    pub fn render(&self, record: &LogRecord) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Timestamp => {
                    out.push_str(&record.timestamp.format(TIMESTAMP_FORMAT).to_string());
                },
                Segment::Level => out.push_str(record.level_abbreviation()),
                Segment::Message => out.push_str(&record.message),
                Segment::Target => out.push_str(&record.target),
                Segment::Properties => self.render_properties(record, &mut out),
                Segment::NewLine => out.push('\n'),
                Segment::Property(name) => out.push_str(record.property(name).unwrap_or_default()),
            }
        }
        out.truncate(out.trim_end().len());
        out
    }

    fn render_properties(&self, record: &LogRecord, out: &mut String) {
        let mut first = true;
        for (key, value) in &record.properties {
            if self.named.contains(key) {
                continue;
            }
            if !first {
                out.push(' ');
            }
            first = false;

            out.push_str(key);
            out.push('=');
            if value.contains(char::is_whitespace) {
                out.push('"');
                out.push_str(value);
                out.push('"');
            } else {
                out.push_str(value);
            }
        }
    }
}

/// `tracing-subscriber` formatter that enriches events and renders them
/// through a [`ConsoleTemplate`]
#[derive(Debug, Clone)]
pub struct EnrichedFormat {
    template: ConsoleTemplate,
    enricher: Arc<ApplicationEnricher>,
}

impl EnrichedFormat {
    /// Create a formatter
    pub const fn new(template: ConsoleTemplate, enricher: Arc<ApplicationEnricher>) -> Self {
        Self { template, enricher }
    }
}

impl<S, N> FormatEvent<S, N> for EnrichedFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut record = LogRecord::from_event(event);
        self.enricher.enrich(&mut record);
        writeln!(writer, "{}", self.template.render(&record))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use tracing::Level;
    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    fn record() -> LogRecord {
        let mut record = LogRecord::new(Level::INFO, "todo", "Add a todo item");
        record.add_property_if_absent("application_id", "1234");
        record.add_property_if_absent("environment", "Local");
        record
    }

    #[test]
    fn renders_known_placeholders() {
        let template = ConsoleTemplate::parse("[{Level}] {Target}: {Message}");
        assert_eq!(template.render(&record()), "[INF] todo: Add a todo item");
    }

    #[test]
    fn renders_named_properties() {
        let template = ConsoleTemplate::parse("appId={application_id} env={environment}");
        assert_eq!(template.render(&record()), "appId=1234 env=Local");
    }

    #[test]
    fn missing_property_renders_empty() {
        let template = ConsoleTemplate::parse("x={nope}|");
        assert_eq!(template.render(&record()), "x=|");
    }

    #[test]
    fn properties_skip_named_ones() {
        let mut record = record();
        record.add_property_if_absent("todo_id", "3");
        record.add_property_if_absent("note", "two words");

        let template = ConsoleTemplate::parse("{environment} {Properties}");
        assert_eq!(
            template.render(&record),
            "Local application_id=1234 note=\"two words\" todo_id=3"
        );
    }

    #[test]
    fn format_suffix_is_ignored() {
        let template = ConsoleTemplate::parse("{Level:u3} {Message:lj}");
        assert_eq!(template.render(&record()), "INF Add a todo item");
    }

    #[test]
    fn escaped_and_unterminated_braces_are_literal() {
        let template = ConsoleTemplate::parse("{{literal}} {Message} {oops");
        assert_eq!(
            template.render(&record()),
            "{literal} Add a todo item {oops"
        );
    }

    #[test]
    fn timestamp_has_millisecond_precision() {
        let template = ConsoleTemplate::parse("{Timestamp}");
        let rendered = template.render(&record());
        // 2024-01-01 12:00:00.000 +00:00
        assert_eq!(rendered.len(), 30);
        assert_eq!(&rendered[19..20], ".");
    }

    #[test]
    fn default_template_renders_enriched_line() {
        let mut record = record();
        record.add_property_if_absent("application_name", "Todo Sample API");
        let rendered = ConsoleTemplate::default().render(&record);

        assert!(rendered.contains("level=[INF]"));
        assert!(rendered.contains("appId=1234"));
        assert!(rendered.contains("appName=Todo Sample API"));
        assert!(rendered.contains("env=Local"));
        assert!(rendered.ends_with("Add a todo item"));
    }

    #[test]
    fn default_template_puts_error_on_its_own_line() {
        let mut record = record();
        record.add_property_if_absent("application_name", "Todo Sample API");
        record.add_property_if_absent("error", "store offline");
        record.add_property_if_absent("todo_id", "3");

        let rendered = ConsoleTemplate::default().render(&record);
        let (first, second) = rendered.split_once('\n').unwrap();

        assert!(first.ends_with("Add a todo item todo_id=3"));
        assert!(!first.contains("store offline"));
        assert_eq!(second, "store offline");
    }

    #[test]
    fn default_template_without_error_is_one_line() {
        let rendered = ConsoleTemplate::default().render(&record());
        assert!(!rendered.contains('\n'));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn formatter_enriches_tracing_events() {
        let captured = Captured::default();
        let enricher = Arc::new(ApplicationEnricher::new("1234", "Todo Sample API", "Local"));
        let subscriber = tracing_subscriber::fmt()
            .event_format(EnrichedFormat::new(
                ConsoleTemplate::parse(
                    "[{Level}] appId={application_id} appName={application_name} \
                     env={environment} {Message} {Properties}",
                ),
                enricher,
            ))
            .with_writer(captured.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(todo_id = 3, "Update a todo item");
            tracing::warn!(environment = "Override", "Explicit field wins");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines[0],
            "[INF] appId=1234 appName=Todo Sample API env=Local Update a todo item todo_id=3"
        );
        assert_eq!(
            lines[1],
            "[WRN] appId=1234 appName=Todo Sample API env=Override Explicit field wins"
        );
    }
}
