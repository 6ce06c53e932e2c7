//! Appender that formats events and enqueues them on a destination writer

use super::destination::DestinationWriter;
use crate::core::{fallback, Appender, LogEvent, Result};
use crate::formatters::{error_marker, Formatter};
use async_trait::async_trait;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Binds a [`Formatter`] to a shared [`DestinationWriter`].
///
/// Many appenders may share one writer; the registry, not the appender,
/// stops the writer.
pub struct QueuedAppender {
    name: String,
    formatter: Arc<dyn Formatter>,
    writer: Arc<DestinationWriter>,
}

impl QueuedAppender {
    pub fn new(
        name: impl Into<String>,
        formatter: Arc<dyn Formatter>,
        writer: Arc<DestinationWriter>,
    ) -> Self {
        Self {
            name: name.into(),
            formatter,
            writer,
        }
    }

    pub fn writer(&self) -> &Arc<DestinationWriter> {
        &self.writer
    }

    /// Format one event as a newline-terminated line, never panicking.
    fn render(&self, event: &LogEvent) -> String {
        let mut line = match catch_unwind(AssertUnwindSafe(|| self.formatter.format(event))) {
            Ok(line) => line,
            Err(payload) => {
                let reason = fallback::panic_message(payload.as_ref());
                fallback::error(format_args!(
                    "Formatter '{}' panicked in appender '{}': {}",
                    self.formatter.name(),
                    self.name,
                    reason
                ));
                error_marker(self.formatter.name(), event, &reason)
            }
        };
        if !line.ends_with('\n') {
            line.push('\n');
        }
        line
    }
}

impl std::fmt::Debug for QueuedAppender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedAppender")
            .field("name", &self.name)
            .field("formatter", &self.formatter.name())
            .field("writer", self.writer.id())
            .finish()
    }
}

#[async_trait]
impl Appender for QueuedAppender {
    async fn append(&self, event: &LogEvent) -> Result<()> {
        let line = self.render(event);
        self.writer.send(line).await
    }

    fn start(&self) {
        self.writer.start();
    }

    fn name(&self) -> &str {
        &self.name
    }
}
