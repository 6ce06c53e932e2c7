//! # Async Logger System
//!
//! An in-process, asynchronous structured logging pipeline built on tokio.
//!
//! ## Features
//!
//! - **Non-blocking**: a log call checks its level, builds the event and
//!   returns; delivery happens on fan-out tasks
//! - **Ordered**: each sink is written by a single consumer in enqueue order
//! - **Backpressure**: bounded per-sink queues wait instead of dropping
//! - **Clean shutdown**: loggers first, then every sink is drained and closed
//! - **Formatters**: simple text, CSV and JSON
//!
//! ```no_run
//! use async_logger_system::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let registry = Registry::new(RegistryConfig::default())?;
//!     let file = registry.file_appender("logs/app.log", Arc::new(JsonFormatter::new()))?;
//!     let logger = registry.logger("app").appender(file).build()?;
//!
//!     logger.info("started");
//!     registry.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod appenders;
pub mod core;
pub mod formatters;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleTarget, QueuedAppender, SinkHandle, SinkId};
    pub use crate::core::{
        scope_data, with_context, with_unit_of_work, Appender, ContextData, Filter, FilterId,
        LevelFilter, LogEvent, LogLevel, Logger, LoggerError, Registry, RegistryConfig, Result,
        TimestampFormat, DEFAULT_SHUTDOWN_TIMEOUT,
    };
    pub use crate::formatters::{CsvFormatter, Formatter, JsonFormatter, SimpleFormatter};
}

pub use crate::appenders::{ConsoleTarget, DestinationWriter, QueuedAppender, SinkId, WriterState};
pub use crate::core::{
    Appender, ContextData, Filter, FilterChain, FilterId, LevelFilter, LogEvent, LogLevel, Logger,
    LoggerBuilder, LoggerError, Registry, RegistryConfig, Result, TimestampFormat,
    DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use crate::formatters::{CsvFormatter, Formatter, JsonFormatter, SimpleFormatter};
