//! Human-readable single-line formatter

use super::Formatter;
use crate::core::{LogEvent, TimestampFormat};
#[cfg(feature = "console")]
use colored::Colorize;

/// `[2025-01-08 10:30:45.123] [INFO ] [main|task-3] svc - message {k=v} | error: ...`
#[derive(Debug, Clone)]
pub struct SimpleFormatter {
    use_colors: bool,
    timestamp_format: TimestampFormat,
}

impl SimpleFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: false,
            timestamp_format: TimestampFormat::simple(),
        }
    }

    /// Colour the level tag with ANSI escapes. Honours `NO_COLOR` and
    /// non-terminal output through `colored`; a no-op without the `console`
    /// feature.
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[cfg(feature = "console")]
    fn level_tag(&self, event: &LogEvent) -> String {
        let padded = format!("{:5}", event.level.to_str());
        if self.use_colors {
            padded.color(event.level.color_code()).to_string()
        } else {
            padded
        }
    }

    #[cfg(not(feature = "console"))]
    fn level_tag(&self, event: &LogEvent) -> String {
        format!("{:5}", event.level.to_str())
    }
}

impl Default for SimpleFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for SimpleFormatter {
    fn format(&self, event: &LogEvent) -> String {
        let mut line = format!(
            "[{}] [{}] [{}] {} - {}",
            self.timestamp_format.format(&event.timestamp),
            self.level_tag(event),
            event.origin(),
            event.logger_name,
            event.message
        );

        if !event.context_data.is_empty() {
            let fields: Vec<String> = event
                .context_data
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            line.push_str(&format!(" {{{}}}", fields.join(", ")));
        }

        if let Some(error) = &event.error {
            line.push_str(" | error: ");
            line.push_str(error);
        }

        line
    }

    fn name(&self) -> &str {
        "simple"
    }
}
