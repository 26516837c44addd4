//! Logging setup shared by every binary and test harness.
//!
//! Pretty mode goes through `tracing_subscriber::fmt`; JSON mode writes one
//! [`StructuredLogEntry`] per event. Both write to stderr so command output on
//! stdout stays machine-readable.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::{self, Write};
use std::str::FromStr;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Field names lifted into [`PerformanceMetrics`]
const DURATION_FIELD: &str = "duration_ms";
const ITEMS_FIELD: &str = "items_count";
const TOKENS_FIELD: &str = "total_tokens";
const BYTES_FIELD: &str = "bytes";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredLogEntry {
    /// RFC 3339, UTC
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ExecutionContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceMetrics>,
}

/// Process identity, captured once when the JSON layer is built
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub app_version: String,
    pub hostname: String,
    pub pid: u32,
}

impl ExecutionContext {
    pub fn capture() -> Self {
        Self {
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            hostname: hostname::get()
                .map(|h| h.to_string_lossy().into_owned())
                .unwrap_or_else(|_| "unknown".to_string()),
            pid: std::process::id(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
}

impl PerformanceMetrics {
    /// Move the well-known numeric fields out of `fields`; `None` when the
    /// event carried none of them
    fn take_from(fields: &mut Map<String, Value>) -> Option<Self> {
        let mut take = |name: &str| match fields.get(name).and_then(Value::as_u64) {
            Some(v) => {
                fields.remove(name);
                Some(v)
            }
            None => None,
        };

        let metrics = Self {
            duration_ms: take(DURATION_FIELD),
            items_count: take(ITEMS_FIELD),
            total_tokens: take(TOKENS_FIELD),
            bytes: take(BYTES_FIELD),
        };
        (metrics != Self::default()).then_some(metrics)
    }
}

/// `tracing` layer emitting [`StructuredLogEntry`] lines
pub struct JsonFormatter {
    context: Option<ExecutionContext>,
}

impl JsonFormatter {
    pub fn new(include_context: bool) -> Self {
        Self {
            context: include_context.then(ExecutionContext::capture),
        }
    }

    pub fn entry(&self, event: &Event<'_>) -> StructuredLogEntry {
        let mut visitor = FieldCollector::default();
        event.record(&mut visitor);

        let mut fields = visitor.fields;
        let performance = PerformanceMetrics::take_from(&mut fields);
        let metadata = event.metadata();

        StructuredLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            level: metadata.level().as_str().to_string(),
            target: metadata.target().to_string(),
            message: visitor.message,
            fields,
            context: self.context.clone(),
            performance,
        }
    }
}

impl<S> Layer<S> for JsonFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if let Ok(line) = serde_json::to_string(&self.entry(event)) {
            let mut stderr = io::stderr().lock();
            let _ = writeln!(stderr, "{line}");
        }
    }
}

#[derive(Default)]
struct FieldCollector {
    message: String,
    fields: Map<String, Value>,
}

impl FieldCollector {
    fn insert(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, Value::String(format!("{value:?}")));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        // NaN and infinities have no JSON form
        self.insert(
            field,
            serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number),
        );
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, value.into());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}' (expected pretty|json)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Used when `RUST_LOG` is not set
    pub level: Level,
    pub format: LogFormat,
    pub color_output: bool,
    /// Attach [`ExecutionContext`] to JSON entries
    pub include_context: bool,
    pub include_line_numbers: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Pretty,
            color_output: console_supports_color(),
            include_context: true,
            include_line_numbers: cfg!(debug_assertions),
        }
    }
}

fn console_supports_color() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

impl LoggingConfig {
    /// Unknown names keep the current level
    pub fn with_level_name(mut self, name: &str) -> Self {
        if let Ok(level) = Level::from_str(name.trim()) {
            self.level = level;
        }
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
    }
}

/// Install the global subscriber. Fails when one is already installed.
pub fn init_structured_logging(config: LoggingConfig) -> anyhow::Result<()> {
    let registry = Registry::default().with(config.env_filter());

    match config.format {
        LogFormat::Json => {
            tracing::subscriber::set_global_default(
                registry.with(JsonFormatter::new(config.include_context)),
            )?;
        }
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .compact()
                .with_writer(io::stderr)
                .with_target(false)
                .with_line_number(config.include_line_numbers)
                .with_ansi(config.color_output);
            tracing::subscriber::set_global_default(registry.with(fmt_layer))?;
        }
    }
    Ok(())
}

/// Times one named operation and logs the outcome with any extra fields
pub struct OperationTimer {
    started: Instant,
    operation: String,
    fields: Map<String, Value>,
}

impl OperationTimer {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            started: Instant::now(),
            operation: operation.into(),
            fields: Map::new(),
        }
    }

    /// Values that fail to serialize are dropped
    pub fn add_field(&mut self, key: impl Into<String>, value: impl Serialize) {
        if let Ok(v) = serde_json::to_value(value) {
            self.fields.insert(key.into(), v);
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    pub fn finish_with_result<T, E: std::fmt::Display>(self, result: &Result<T, E>) {
        let duration_ms = self.elapsed_ms();
        let fields = Value::Object(self.fields);

        match result {
            Ok(_) => tracing::info!(
                operation = %self.operation,
                duration_ms,
                success = true,
                fields = %fields,
                "Operation completed"
            ),
            Err(e) => tracing::error!(
                operation = %self.operation,
                duration_ms,
                success = false,
                error = %e,
                fields = %fields,
                "Operation failed"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_flattens_fields_and_skips_empty_sections() {
        let mut fields = Map::new();
        fields.insert("part_id".to_string(), Value::String("abc".to_string()));

        let entry = StructuredLogEntry {
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            level: "INFO".to_string(),
            target: "recognition::analyzer".to_string(),
            message: "Analysis finished".to_string(),
            fields,
            context: None,
            performance: None,
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["part_id"], "abc");
        assert!(json.get("context").is_none());
        assert!(json.get("performance").is_none());
    }

    #[test]
    fn test_metrics_are_lifted_out_of_fields() {
        let mut fields = Map::new();
        fields.insert("duration_ms".to_string(), Value::from(120u64));
        fields.insert("total_tokens".to_string(), Value::from(900u64));
        fields.insert("model".to_string(), Value::from("gemini"));

        let metrics = PerformanceMetrics::take_from(&mut fields).unwrap();
        assert_eq!(metrics.duration_ms, Some(120));
        assert_eq!(metrics.total_tokens, Some(900));
        assert_eq!(metrics.bytes, None);
        assert_eq!(fields.len(), 1);

        let mut plain = Map::new();
        plain.insert("model".to_string(), Value::from("gemini"));
        assert!(PerformanceMetrics::take_from(&mut plain).is_none());
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_level_name_override() {
        assert_eq!(LoggingConfig::default().with_level_name("debug").level, Level::DEBUG);
        assert_eq!(LoggingConfig::default().with_level_name("loud").level, Level::INFO);
    }
}
