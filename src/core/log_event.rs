//! Log event structure

use super::log_context::{self, ContextData};
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

// Thread-local cache for the thread label to avoid repeated allocations
thread_local! {
    static THREAD_LABEL_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Thread name if set, otherwise its id; computed once per thread.
fn thread_label() -> String {
    THREAD_LABEL_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| {
                let current = std::thread::current();
                match current.name() {
                    Some(name) => name.to_string(),
                    None => format!("{:?}", current.id()),
                }
            })
            .clone()
    })
}

/// Explicit unit-of-work name, else the id of the running tokio task.
fn unit_of_work() -> Option<String> {
    log_context::current_unit_of_work()
        .or_else(|| tokio::task::try_id().map(|id| format!("task-{}", id)))
}

/// Render an error and its `source()` chain on a single line.
pub fn describe_error(error: &(dyn std::error::Error + 'static)) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": caused by: ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

/// One accepted log occurrence. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub logger_name: String,
    pub thread: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_of_work: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "ContextData::is_empty")]
    pub context_data: ContextData,
}

impl LogEvent {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// so that one event always renders as one line.
    fn sanitize(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    fn sanitize_context(context: ContextData) -> ContextData {
        context
            .into_iter()
            .map(|(key, value)| (Self::sanitize(&key), Self::sanitize(&value)))
            .collect()
    }

    /// Build an event stamped with the current time, thread and context.
    pub fn new(level: LogLevel, logger_name: impl Into<String>, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            logger_name: logger_name.into(),
            thread: thread_label(),
            unit_of_work: unit_of_work(),
            message: Self::sanitize(message),
            error: None,
            context_data: Self::sanitize_context(log_context::current_context_data()),
        }
    }

    pub fn with_error(mut self, error: &(dyn std::error::Error + 'static)) -> Self {
        self.error = Some(Self::sanitize(&describe_error(error)));
        self
    }

    /// Merge explicit context over whatever the task-local scope supplied.
    pub fn with_context(mut self, context: ContextData) -> Self {
        self.context_data.extend(Self::sanitize_context(context));
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_thread(mut self, thread: impl Into<String>) -> Self {
        self.thread = thread.into();
        self
    }

    /// Thread label, suffixed with the unit of work when there is one.
    pub fn origin(&self) -> String {
        match &self.unit_of_work {
            Some(unit) => format!("{}|{}", self.thread, unit),
            None => self.thread.clone(),
        }
    }
}
