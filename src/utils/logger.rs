use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::ConfigError;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::fmt::Write as _;
use tracing::field::{Field, Visit};

/// Event fields renamed to their OTel semantic-convention names.
const ATTRIBUTE_RENAMES: &[(&str, &str)] = &[
    ("event_name", "event.name"),
    ("event_domain", "event.domain"),
    ("request_id", "http.request.id"),
    ("method", "http.request.method"),
    ("url", "url.full"),
    ("status", "http.response.status_code"),
];

#[derive(Default)]
struct JsonFieldVisitor {
    fields: Map<String, Value>,
}

impl JsonFieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for JsonFieldVisitor {
    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, Value::from(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, Value::from(format!("{:?}", value)));
    }
}

/// Where an event was emitted from.
struct EventSite<'a> {
    level: Level,
    target: &'a str,
    name: &'a str,
    file: Option<&'a str>,
    line: Option<u32>,
}

#[derive(Clone)]
struct OtelJsonEventFormatter {
    service_name: String,
    service_version: String,
}

impl OtelJsonEventFormatter {
    fn severity_number(level: &Level) -> u64 {
        match *level {
            Level::TRACE => 1,
            Level::DEBUG => 5,
            Level::INFO => 9,
            Level::WARN => 13,
            Level::ERROR => 17,
        }
    }

    fn build_record(&self, site: &EventSite<'_>, fields: Map<String, Value>) -> Value {
        let mut attributes = fields;
        for (from, to) in ATTRIBUTE_RENAMES {
            if let Some(v) = attributes.remove(*from) {
                attributes.insert((*to).to_string(), v);
            }
        }
        if let Some(file) = site.file {
            attributes.insert("code.filepath".to_string(), Value::from(file));
        }
        if let Some(line) = site.line {
            attributes.insert("code.lineno".to_string(), Value::from(line));
        }
        attributes.insert("code.target".to_string(), Value::from(site.target));

        let body = attributes
            .remove("message")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| site.name.to_string());

        let mut resource = Map::new();
        resource.insert(
            "service.name".to_string(),
            Value::from(self.service_name.clone()),
        );
        resource.insert(
            "service.version".to_string(),
            Value::from(self.service_version.clone()),
        );

        let mut root = Map::new();
        root.insert(
            "timestamp".to_string(),
            Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        root.insert(
            "severity_text".to_string(),
            Value::from(site.level.as_str()),
        );
        root.insert(
            "severity_number".to_string(),
            Value::from(Self::severity_number(&site.level)),
        );
        root.insert("body".to_string(), Value::from(body));
        root.insert("resource".to_string(), Value::Object(resource));
        root.insert("attributes".to_string(), Value::Object(attributes));
        Value::Object(root)
    }
}

impl<S, N> FormatEvent<S, N> for OtelJsonEventFormatter
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let mut visitor = JsonFieldVisitor::default();
        event.record(&mut visitor);

        let metadata = event.metadata();
        let site = EventSite {
            level: *metadata.level(),
            target: metadata.target(),
            name: metadata.name(),
            file: metadata.file(),
            line: metadata.line(),
        };
        let record = self.build_record(&site, visitor.fields);
        let serialized = serde_json::to_string(&record).map_err(|_| std::fmt::Error)?;
        writer.write_str(&serialized)?;
        writer.write_char('\n')?;
        Ok(())
    }
}

fn parse_level(level: &str) -> Result<LevelFilter, ConfigError> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" => Ok(LevelFilter::WARN),
        "error" => Ok(LevelFilter::ERROR),
        _ => Err(ConfigError::InvalidLogLevel(level.to_string())),
    }
}

/// Installs the global subscriber. Output goes to stderr so that command
/// output on stdout stays machine-readable.
pub fn init_logging(logging_config: &LoggingConfig) -> Result<(), ConfigError> {
    let level_filter = parse_level(&logging_config.level)?;

    // RUST_LOG directives still apply on top of the configured default.
    let filter_layer = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .from_env_lossy();

    let result = match logging_config.format.to_lowercase().as_str() {
        "json" => {
            // OTel-aligned structured JSON output
            tracing_subscriber::registry()
                .with(filter_layer)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .event_format(OtelJsonEventFormatter {
                            service_name: logging_config.service_name.clone(),
                            service_version: logging_config.service_version.clone(),
                        }),
                )
                .try_init()
        }
        _ => {
            // Human-readable console output with ANSI colors
            tracing_subscriber::registry()
                .with(filter_layer)
                .with(fmt::layer().with_writer(std::io::stderr).pretty())
                .try_init()
        }
    };

    if let Err(e) = result {
        // A subscriber is already installed (tests, embedding apps); keep it.
        eprintln!("Logging already initialised: {}", e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_accepts_known_levels() {
        assert_eq!(parse_level("INFO").unwrap(), LevelFilter::INFO);
        assert_eq!(parse_level(" debug ").unwrap(), LevelFilter::DEBUG);
    }

    #[test]
    fn test_parse_level_rejects_unknown() {
        assert!(matches!(
            parse_level("verbose"),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn test_init_logging_rejects_invalid_level() {
        let config = LoggingConfig {
            level: "loud".to_string(),
            ..LoggingConfig::default()
        };
        assert!(init_logging(&config).is_err());
    }

    #[test]
    fn test_attribute_renames() {
        let mut fields = Map::new();
        fields.insert("event_name".into(), Value::from("session.refresh.started"));
        fields.insert("status".into(), Value::from(401u64));
        fields.insert("message".into(), Value::from("refreshing session"));

        let formatter = OtelJsonEventFormatter {
            service_name: "storefront-client".into(),
            service_version: "0.1.0".into(),
        };
        let record = formatter.build_record(
            &EventSite {
                level: Level::INFO,
                target: "storefront_client::interceptor",
                name: "event",
                file: Some("src/interceptor/interceptor.rs"),
                line: Some(42),
            },
            fields,
        );

        assert_eq!(record["body"], "refreshing session");
        assert_eq!(record["severity_text"], "INFO");
        assert_eq!(record["severity_number"], 9);
        assert_eq!(
            record["attributes"]["event.name"],
            "session.refresh.started"
        );
        assert_eq!(record["attributes"]["http.response.status_code"], 401);
        assert_eq!(record["attributes"]["code.lineno"], 42);
        assert_eq!(record["resource"]["service.name"], "storefront-client");
    }
}
