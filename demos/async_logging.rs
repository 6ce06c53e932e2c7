//! Async logging example
//!
//! Demonstrates logging from many tasks and OS threads, task-local context
//! and bounded shutdown.
//!
//! Run with: cargo run --example async_logging

use async_logger_system::core::log_context::propagate;
use async_logger_system::prelude::*;
use async_logger_system::info;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> Result<()> {
    println!("=== Async Logger System - Async Logging Example ===\n");

    let registry = Registry::new(
        RegistryConfig::new()
            .queue_capacity(64)
            .create_parent_dirs(true)
            .shutdown_timeout(Duration::from_secs(2)),
    )?;
    let file = registry.file_appender("logs/async.log", Arc::new(SimpleFormatter::new()))?;
    let logger = registry.logger("async").appender(file).build()?;

    println!("1. Many tasks logging with request context:");
    let mut tasks = Vec::new();
    for request in 0..5 {
        let logger = Arc::clone(&logger);
        let context = scope_data([("request_id", format!("req-{}", request))]);
        tasks.push(tokio::spawn(with_context(context, async move {
            with_unit_of_work("handle_request", async {
                for step in 0..20 {
                    info!(logger, "step {}", step);
                }
                // Child tasks only see the context when it is carried over.
                let child = Arc::clone(&logger);
                tokio::spawn(propagate(async move { child.debug("child task done") }))
                    .await
                    .ok();
            })
            .await
        })));
    }
    for task in tasks {
        task.await.ok();
    }
    println!("   5 tasks logged 20 messages each");

    println!("\n2. Plain OS threads:");
    let handles: Vec<_> = (0..3)
        .map(|t| {
            let logger = Arc::clone(&logger);
            std::thread::spawn(move || {
                for i in 0..10 {
                    logger.info(&format!("thread {} message {}", t, i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().ok();
    }
    println!("   3 threads logged 10 messages each");
    println!("   Pending fan-out tasks: {}", logger.pending_tasks());

    let completed = registry.shutdown_timeout(Duration::from_secs(2)).await;

    println!("\n=== Example completed (drained: {}) ===", completed);
    println!("Check 'logs/async.log' for file output");
    Ok(())
}
