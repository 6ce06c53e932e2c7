//! Error types for the logging pipeline

pub type Result<T> = std::result::Result<T, LoggerError>;

/// Failures surfaced to callers of the registry, appenders and writers.
///
/// Failures that happen inside background tasks are never returned to the
/// code that logged; they are reported through [`fallback`](super::fallback).
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Filesystem operation that failed before a destination existed
    #[error("IO error while {operation} '{target}': {source}")]
    IoOperation {
        operation: String,
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// A file destination could not be resolved or opened
    #[error("Cannot use '{path}' as a log file: {message}")]
    FileDestination { path: String, message: String },

    /// The destination writer has been stopped and accepts no more lines
    #[error("Destination '{sink}' is closed")]
    DestinationClosed { sink: String },

    #[error("Logger registry already shut down")]
    RegistryShutDown,

    #[error("No tokio runtime available: {0}")]
    NoRuntime(String),

    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    pub fn io_operation(
        operation: impl Into<String>,
        target: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            target: target.into(),
            source,
        }
    }

    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn file_destination(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileDestination {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn destination_closed(sink: impl Into<String>) -> Self {
        LoggerError::DestinationClosed { sink: sink.into() }
    }

    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Whether this error means the destination stopped accepting input.
    pub fn is_closed(&self) -> bool {
        matches!(self, LoggerError::DestinationClosed { .. })
    }
}
