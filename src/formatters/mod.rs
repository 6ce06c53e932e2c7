//! Formatter implementations
//!
//! A formatter turns one [`LogEvent`] into one line of text. Formatters are
//! pure and stateless apart from their own options; the appender adds the
//! trailing newline.

pub mod csv;
pub mod json;
pub mod simple;

pub use csv::CsvFormatter;
pub use json::JsonFormatter;
pub use simple::SimpleFormatter;

use crate::core::LogEvent;

/// `Event -> String` rendering used by queued appenders.
///
/// Implementations must not panic for a well-formed event; if one does, the
/// appender substitutes an error marker for the line.
pub trait Formatter: Send + Sync {
    fn format(&self, event: &LogEvent) -> String;

    fn name(&self) -> &str;
}

impl<F: Formatter + ?Sized> Formatter for std::sync::Arc<F> {
    fn format(&self, event: &LogEvent) -> String {
        (**self).format(event)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Line written in place of an event the formatter could not render.
pub(crate) fn error_marker(formatter: &str, event: &LogEvent, reason: &str) -> String {
    format!(
        "[FORMAT ERROR] formatter={} logger={} level={} reason={} message={}",
        formatter, event.logger_name, event.level, reason, event.message
    )
}
