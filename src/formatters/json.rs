//! JSON formatter for structured logging
//!
//! Writes each event as a single compact JSON object (JSONL when one object
//! per line), compatible with log aggregation tools.

use super::Formatter;
use crate::core::{ContextData, LogEvent, TimestampFormat};
use serde::Serialize;

#[derive(Serialize)]
struct JsonRecord<'a> {
    timestamp: serde_json::Value,
    level: &'a str,
    logger: &'a str,
    thread: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit_of_work: Option<&'a str>,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "no_context")]
    context: &'a ContextData,
}

fn no_context(context: &&ContextData) -> bool {
    context.is_empty()
}

#[derive(Debug, Clone)]
pub struct JsonFormatter {
    timestamp_format: TimestampFormat,
    include_error: bool,
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self {
            timestamp_format: TimestampFormat::Iso8601,
            include_error: true,
            pretty: false,
        }
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Leave the `error` field out of every record.
    #[must_use]
    pub fn include_error(mut self, include: bool) -> Self {
        self.include_error = include;
        self
    }

    /// Multi-line output; only sensible for console debugging.
    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn timestamp_value(&self, event: &LogEvent) -> serde_json::Value {
        match self.timestamp_format {
            TimestampFormat::UnixMillis => {
                serde_json::Value::Number(event.timestamp.timestamp_millis().into())
            }
            _ => serde_json::Value::String(self.timestamp_format.format(&event.timestamp)),
        }
    }

    fn error_record(event: &LogEvent, err: &serde_json::Error) -> String {
        serde_json::json!({
            "error": "Failed to serialize log event",
            "details": err.to_string(),
            "event_message": event.message,
        })
        .to_string()
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, event: &LogEvent) -> String {
        let record = JsonRecord {
            timestamp: self.timestamp_value(event),
            level: event.level.to_str(),
            logger: &event.logger_name,
            thread: &event.thread,
            unit_of_work: event.unit_of_work.as_deref(),
            message: &event.message,
            error: if self.include_error {
                event.error.as_deref()
            } else {
                None
            },
            context: &event.context_data,
        };

        let result = if self.pretty {
            serde_json::to_string_pretty(&record)
        } else {
            serde_json::to_string(&record)
        };
        result.unwrap_or_else(|err| Self::error_record(event, &err))
    }

    fn name(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_context::scope_data;
    use crate::core::LogLevel;
    use serde_json::Value;

    fn event() -> LogEvent {
        let mut event = LogEvent::new(LogLevel::Error, "payments", "charge \"failed\"")
            .with_thread("worker-2")
            .with_context(scope_data([("order_id", "42")]));
        event.error = Some("card declined".to_string());
        event
    }

    #[test]
    fn test_fields() {
        let line = JsonFormatter::new().format(&event());
        assert!(!line.contains('\n'));

        let value: Value = serde_json::from_str(&line).expect("valid json");
        assert_eq!(value["level"], "ERROR");
        assert_eq!(value["logger"], "payments");
        assert_eq!(value["thread"], "worker-2");
        assert_eq!(value["message"], "charge \"failed\"");
        assert_eq!(value["error"], "card declined");
        assert_eq!(value["context"]["order_id"], "42");
        assert!(value["timestamp"].as_str().is_some_and(|ts| ts.ends_with('Z')));
    }

    #[test]
    fn test_exclude_error() {
        let line = JsonFormatter::new().include_error(false).format(&event());
        let value: Value = serde_json::from_str(&line).expect("valid json");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_numeric_timestamp() {
        let line = JsonFormatter::new()
            .with_timestamp_format(TimestampFormat::UnixMillis)
            .format(&event());
        let value: Value = serde_json::from_str(&line).expect("valid json");
        assert!(value["timestamp"].is_i64());
    }

    #[test]
    fn test_empty_context_omitted() {
        let line = JsonFormatter::new().format(&LogEvent::new(LogLevel::Info, "svc", "hi"));
        let value: Value = serde_json::from_str(&line).expect("valid json");
        assert!(value.get("context").is_none());
    }
}
