//! Core logger types and traits

pub mod appender;
pub mod config;
pub mod error;
pub mod fallback;
pub mod filter;
pub mod log_context;
pub mod log_event;
pub mod log_level;
pub mod logger;
pub mod registry;
pub mod timestamp;

pub use appender::Appender;
pub use config::{RegistryConfig, DEFAULT_QUEUE_CAPACITY, DEFAULT_SHUTDOWN_TIMEOUT};
pub use error::{LoggerError, Result};
pub use filter::{Filter, FilterChain, FilterId, LevelFilter};
pub use log_context::{
    current_context_data, current_unit_of_work, scope_data, with_context, with_unit_of_work,
    ContextData, LoggingContext,
};
pub use log_event::LogEvent;
pub use log_level::{AtomicLevel, LogLevel};
pub use logger::Logger;
pub use registry::{LoggerBuilder, Registry};
pub use timestamp::TimestampFormat;
