//! Basic logger usage example
//!
//! Demonstrates console logging, level control, filters and the logging macros.
//!
//! Run with: cargo run --example basic_usage

use async_logger_system::prelude::*;
use async_logger_system::{debug, error, info, trace, warn};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Async Logger System - Basic Usage Example ===\n");

    let registry = Registry::new(RegistryConfig::new().level(LogLevel::Trace))?;
    let console = registry.console_appender(ConsoleTarget::Stdout, Arc::new(SimpleFormatter::new()))?;
    let logger = registry.logger("basic").appender(console).build()?;

    println!("1. Logging at different levels:");
    logger.trace("This is a TRACE message");
    logger.debug("This is a DEBUG message");
    logger.info("This is an INFO message");
    logger.warn("This is a WARN message");
    logger.error("This is an ERROR message");

    println!("\n2. Using macros with format arguments:");
    let user = "alice";
    let attempts = 3;
    trace!(logger, "Entering login for {}", user);
    debug!(logger, "Checking credentials ({} attempts left)", attempts);
    info!(logger, "User {} logged in", user);
    warn!(logger, "{} failed attempts before success", attempts - 1);

    let cause = std::io::Error::new(std::io::ErrorKind::TimedOut, "session store timed out");
    error!(logger, err = cause; "Could not persist session for {}", user);

    println!("\n3. Raising the global level to WARN:");
    registry.set_global_level(LogLevel::Warn);
    logger.info("Hidden: INFO is below the global level");
    logger.warn("Shown: WARN passes");

    println!("\n4. Filtering out health checks:");
    registry.set_global_level(LogLevel::Trace);
    let id = logger.add_filter(|event: &LogEvent| !event.message.contains("/health"));
    logger.info("GET /health 200");
    logger.info("GET /orders 200");
    logger.remove_filter(id);

    registry.shutdown().await;

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
