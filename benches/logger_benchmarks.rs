//! Criterion benchmarks for async_logger_system

use async_logger_system::core::FilterChain;
use async_logger_system::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .expect("Failed to build runtime")
}

/// Registry with one logger writing to a discarding sink.
fn discarding_logger(
    runtime: &Runtime,
    level: LogLevel,
    formatter: Arc<dyn Formatter>,
) -> (Arc<Registry>, Arc<Logger>) {
    let registry = Registry::with_handle(
        RegistryConfig::new().level(level),
        runtime.handle().clone(),
    )
    .expect("registry");
    let appender = registry
        .sink_appender("discard", Box::new(tokio::io::sink()), formatter)
        .expect("appender");
    let logger = registry
        .logger("bench")
        .appender(appender)
        .build()
        .expect("logger");
    (registry, logger)
}

// ============================================================================
// Level Filtering Benchmarks
// ============================================================================

fn bench_level_filtering(c: &mut Criterion) {
    let runtime = runtime();
    let (registry, logger) =
        discarding_logger(&runtime, LogLevel::Warn, Arc::new(SimpleFormatter::new()));

    let mut group = c.benchmark_group("level_filtering");
    group.throughput(Throughput::Elements(1));

    group.bench_function("disabled_thunk", |b| {
        b.iter(|| {
            logger.log(black_box(LogLevel::Debug), None, || {
                format!("never built {}", black_box(42))
            });
        });
    });

    group.bench_function("is_enabled", |b| {
        b.iter(|| black_box(logger.is_enabled(black_box(LogLevel::Info))));
    });

    group.finish();
    runtime.block_on(registry.shutdown());
}

// ============================================================================
// Logging Throughput Benchmarks
// ============================================================================

fn bench_logging(c: &mut Criterion) {
    let runtime = runtime();
    let mut group = c.benchmark_group("logging");
    group.throughput(Throughput::Elements(1));

    let formatters: Vec<(&str, Arc<dyn Formatter>)> = vec![
        ("simple", Arc::new(SimpleFormatter::new())),
        ("csv", Arc::new(CsvFormatter::new())),
        ("json", Arc::new(JsonFormatter::new())),
    ];

    for (name, formatter) in formatters {
        let (registry, logger) = discarding_logger(&runtime, LogLevel::Info, formatter);
        group.bench_function(name, |b| {
            b.iter(|| logger.info(black_box("Request processed")));
        });
        runtime.block_on(registry.shutdown());
    }

    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let runtime = runtime();
    let mut group = c.benchmark_group("end_to_end");
    group.throughput(Throughput::Elements(1_000));

    group.bench_function("1000_events_then_shutdown", |b| {
        b.to_async(&runtime).iter(|| async {
            let (sink, _) = tokio::io::duplex(1 << 20);
            let registry = Registry::new(RegistryConfig::default()).expect("registry");
            let appender = registry
                .sink_appender("memory", Box::new(sink), Arc::new(SimpleFormatter::new()))
                .expect("appender");
            let logger = registry
                .logger("e2e")
                .appender(appender)
                .build()
                .expect("logger");
            for i in 0..1_000 {
                logger.info(&format!("event {}", i));
            }
            registry.shutdown().await;
        });
    });

    group.finish();
}

// ============================================================================
// Formatter and Filter Benchmarks
// ============================================================================

fn bench_formatters(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatters");
    let event = LogEvent::new(LogLevel::Warn, "bench", "disk usage high, \"sda1\" at 91%")
        .with_context(scope_data([("host", "db-1"), ("mount", "/var")]));

    let simple = SimpleFormatter::new();
    let csv = CsvFormatter::new();
    let json = JsonFormatter::new();

    group.bench_function("simple", |b| b.iter(|| black_box(simple.format(&event))));
    group.bench_function("csv", |b| b.iter(|| black_box(csv.format(&event))));
    group.bench_function("json", |b| b.iter(|| black_box(json.format(&event))));
    group.finish();
}

fn bench_filter_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_chain");
    let event = LogEvent::new(LogLevel::Info, "bench", "GET /orders 200");

    for size in [0usize, 1, 4, 16] {
        let chain = FilterChain::new();
        for _ in 0..size {
            chain.add(|e: &LogEvent| !e.message.contains("/health"));
        }
        group.bench_function(format!("{}_filters", size), |b| {
            b.iter(|| black_box(chain.accepts(&event)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_level_filtering,
    bench_logging,
    bench_end_to_end,
    bench_formatters,
    bench_filter_chain
);

criterion_main!(benches);
