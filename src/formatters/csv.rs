//! CSV formatter
//!
//! Columns, in order: `timestamp, level, thread, logger, message, context, error`.
//! Fields are escaped per RFC 4180.

use super::{error_marker, Formatter};
use crate::core::{LogEvent, TimestampFormat};

/// Quote a field if it contains a comma, quote, CR or LF; double embedded quotes.
///
/// ```
/// use async_logger_system::formatters::csv::escape_field;
///
/// assert_eq!(escape_field("plain"), "plain");
/// assert_eq!(escape_field("a,b"), "\"a,b\"");
/// assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
/// ```
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CsvFormatter {
    timestamp_format: TimestampFormat,
}

impl CsvFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Header row matching the column order of [`Formatter::format`].
    pub fn header() -> &'static str {
        "timestamp,level,thread,logger,message,context,error"
    }

    /// Context as a JSON object, or an empty column when there is none.
    fn context_column(event: &LogEvent) -> String {
        if event.context_data.is_empty() {
            return String::new();
        }
        serde_json::to_string(&event.context_data)
            .unwrap_or_else(|e| error_marker("csv", event, &e.to_string()))
    }
}

impl Formatter for CsvFormatter {
    fn format(&self, event: &LogEvent) -> String {
        let timestamp = self.timestamp_format.format(&event.timestamp);
        let context = Self::context_column(event);
        let thread = event.origin();
        let columns = [
            timestamp.as_str(),
            event.level.to_str(),
            thread.as_str(),
            event.logger_name.as_str(),
            event.message.as_str(),
            context.as_str(),
            event.error.as_deref().unwrap_or(""),
        ];
        columns
            .iter()
            .map(|field| escape_field(field))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn name(&self) -> &str {
        "csv"
    }
}
