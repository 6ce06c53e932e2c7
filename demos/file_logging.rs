//! File logging example
//!
//! Demonstrates CSV and JSON file output, shared file writers and the
//! console fallback when a file cannot be opened.
//!
//! Run with: cargo run --example file_logging

use async_logger_system::prelude::*;
use async_logger_system::info;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Async Logger System - File Logging Example ===\n");

    let registry = Registry::new(RegistryConfig::new().create_parent_dirs(true))?;

    println!("1. CSV and JSON files:");
    let csv = registry.file_appender("logs/app.csv", Arc::new(CsvFormatter::new()))?;
    let json = registry.file_appender(
        "logs/app.jsonl",
        Arc::new(JsonFormatter::new().with_timestamp_format(TimestampFormat::UnixMillis)),
    )?;
    let app = registry.logger("app").appender(csv).appender(json).build()?;

    for i in 0..5 {
        info!(app, "Processing batch {}", i);
    }
    app.warn("Message with \"quotes\", commas, and\nnewlines");
    println!("   Wrote 6 events to logs/app.csv and logs/app.jsonl");

    println!("\n2. Two loggers sharing one file:");
    for name in ["orders", "payments"] {
        let shared = registry.file_appender("logs/./shared.log", Arc::new(SimpleFormatter::new()))?;
        let logger = registry.logger(name).appender(shared).build()?;
        info!(logger, "{} service ready", name);
    }
    println!("   Open file writers: {}", registry.writers_len());

    println!("\n3. Falling back to the console:");
    let appender = match registry.file_appender("/proc/forbidden/app.log", Arc::new(SimpleFormatter::new())) {
        Ok(appender) => appender,
        Err(e) => {
            println!("   File unavailable ({}), using stderr", e);
            registry.console_appender(ConsoleTarget::Stderr, Arc::new(SimpleFormatter::new()))?
        }
    };
    let fallback = registry.logger("fallback").appender(appender).build()?;
    fallback.error("Still logged somewhere");

    let completed = registry.shutdown_default().await;

    println!("\n=== Example completed (clean shutdown: {}) ===", completed);
    println!("CSV header: {}", CsvFormatter::header());
    Ok(())
}
