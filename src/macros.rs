//! Logging macros for ergonomic log message formatting.
//!
//! The format arguments are wrapped in a closure, so nothing is formatted
//! unless the level is enabled for the logger.
//!
//! # Examples
//!
//! ```
//! use async_logger_system::prelude::*;
//! use async_logger_system::{error, info};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<()> {
//! let registry = Registry::new(RegistryConfig::default())?;
//! let logger = registry.logger("server").build()?;
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // Attaching an error
//! let err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use");
//! error!(logger, err = err; "Failed to bind port {}", port);
//!
//! registry.shutdown().await;
//! # Ok(())
//! # }
//! ```

/// Log a lazily formatted message at `$level`.
///
/// An error value can be attached with `err = <expr>;` before the format
/// string; it is borrowed, not consumed.
///
/// ```no_run
/// # use async_logger_system::prelude::*;
/// # fn demo(logger: &Logger) {
/// use async_logger_system::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
///
/// let cause = std::fmt::Error;
/// log!(logger, LogLevel::Warn, err = cause; "render failed");
/// # }
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, err = $err:expr; $($arg:tt)+) => {
        $logger.log(
            $level,
            ::core::option::Option::Some(&$err as &(dyn ::std::error::Error + 'static)),
            || ::std::format!($($arg)+),
        )
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, ::core::option::Option::None, || ::std::format!($($arg)+))
    };
}

/// Log a trace-level message.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}
