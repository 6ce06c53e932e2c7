//! Destination writer: one bounded queue and one consumer task per sink
//!
//! Every line bound for a sink goes through the writer's queue, and a single
//! consumer task writes them in the order they were enqueued. Producers that
//! find the queue full wait for a slot; nothing is dropped.
//!
//! Lifecycle is `Created -> Running -> Stopped`. `Stopped` is terminal.

use super::sink::{SinkHandle, SinkId};
use crate::core::{fallback, LoggerError, Result};
use parking_lot::Mutex;
use tokio::io::AsyncWriteExt;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Created,
    Running,
    Stopped,
}

enum Lifecycle {
    Created {
        receiver: mpsc::Receiver<String>,
        sink: SinkHandle,
    },
    Running {
        consumer: JoinHandle<()>,
    },
    Stopped,
}

impl Lifecycle {
    fn state(&self) -> WriterState {
        match self {
            Lifecycle::Created { .. } => WriterState::Created,
            Lifecycle::Running { .. } => WriterState::Running,
            Lifecycle::Stopped => WriterState::Stopped,
        }
    }
}

pub struct DestinationWriter {
    id: SinkId,
    capacity: usize,
    sender: Mutex<Option<mpsc::Sender<String>>>,
    lifecycle: Mutex<Lifecycle>,
    abort_handle: Mutex<Option<AbortHandle>>,
    handle: Handle,
}

impl DestinationWriter {
    /// Create a writer in the `Created` state. A capacity of zero is raised to one.
    pub fn new(id: SinkId, capacity: usize, sink: SinkHandle, handle: Handle) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        Self {
            id,
            capacity,
            sender: Mutex::new(Some(sender)),
            lifecycle: Mutex::new(Lifecycle::Created { receiver, sink }),
            abort_handle: Mutex::new(None),
            handle,
        }
    }

    pub fn id(&self) -> &SinkId {
        &self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn state(&self) -> WriterState {
        self.lifecycle.lock().state()
    }

    /// Lines currently waiting in the queue.
    pub fn queued(&self) -> usize {
        self.sender
            .lock()
            .as_ref()
            .map(|tx| tx.max_capacity() - tx.capacity())
            .unwrap_or(0)
    }

    /// Spawn the consumer task. Only the first call has any effect.
    pub fn start(&self) {
        let mut lifecycle = self.lifecycle.lock();
        if !matches!(*lifecycle, Lifecycle::Created { .. }) {
            return;
        }
        if let Lifecycle::Created { receiver, sink } =
            std::mem::replace(&mut *lifecycle, Lifecycle::Stopped)
        {
            let consumer = self.handle.spawn(consume(self.id.clone(), receiver, sink));
            *self.abort_handle.lock() = Some(consumer.abort_handle());
            *lifecycle = Lifecycle::Running { consumer };
        }
    }

    /// Enqueue one line, waiting for a free slot while the queue is full.
    ///
    /// Fails with `DestinationClosed` once `stop` or `abort` has begun.
    pub async fn send(&self, line: String) -> Result<()> {
        let sender = self.sender.lock().clone();
        match sender {
            Some(tx) => tx
                .send(line)
                .await
                .map_err(|_| LoggerError::destination_closed(self.id.to_string())),
            None => Err(LoggerError::destination_closed(self.id.to_string())),
        }
    }

    /// Stop accepting lines, drain what is queued, then flush and close the sink.
    ///
    /// The first call does the work; later calls return immediately.
    pub async fn stop(&self) {
        self.sender.lock().take();
        let previous = std::mem::replace(&mut *self.lifecycle.lock(), Lifecycle::Stopped);

        match previous {
            Lifecycle::Created { receiver, mut sink } => {
                drop(receiver);
                if let Err(e) = sink.shutdown().await {
                    fallback::error(format_args!("Failed to close '{}': {}", self.id, e));
                }
            }
            Lifecycle::Running { consumer } => {
                if let Err(e) = consumer.await {
                    if e.is_cancelled() {
                        fallback::warning(format_args!(
                            "Writer for '{}' was cancelled before draining its queue",
                            self.id
                        ));
                    } else {
                        fallback::critical(format_args!(
                            "Writer for '{}' panicked: {}",
                            self.id,
                            fallback::panic_message(e.into_panic().as_ref())
                        ));
                    }
                }
            }
            Lifecycle::Stopped => {}
        }
    }

    /// Cancel the consumer immediately, discarding anything not yet written.
    ///
    /// The writer is `Stopped` afterwards, whatever state it was in.
    pub fn abort(&self) {
        self.sender.lock().take();
        if let Some(abort) = self.abort_handle.lock().take() {
            abort.abort();
        }
        // Dropping the consumer handle detaches the cancelled task.
        *self.lifecycle.lock() = Lifecycle::Stopped;
    }
}

impl std::fmt::Debug for DestinationWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DestinationWriter")
            .field("id", &self.id)
            .field("capacity", &self.capacity)
            .field("state", &self.state())
            .finish()
    }
}

/// Consumer loop: FIFO, one line at a time, flushed after every write.
async fn consume(id: SinkId, mut receiver: mpsc::Receiver<String>, mut sink: SinkHandle) {
    while let Some(line) = receiver.recv().await {
        if let Err(e) = write_line(&mut sink, &line).await {
            fallback::error(format_args!("Failed to write to '{}': {}", id, e));
        }
    }

    if let Err(e) = sink.flush().await {
        fallback::error(format_args!("Failed to flush '{}': {}", id, e));
    }
    if let Err(e) = sink.shutdown().await {
        fallback::error(format_args!("Failed to close '{}': {}", id, e));
    }
}

async fn write_line(sink: &mut SinkHandle, line: &str) -> std::io::Result<()> {
    sink.write_all(line.as_bytes()).await?;
    sink.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::AsyncReadExt;

    fn memory_writer(capacity: usize) -> (DestinationWriter, tokio::io::DuplexStream) {
        let (sink, reader) = tokio::io::duplex(64 * 1024);
        let writer = DestinationWriter::new(
            SinkId::Named("memory".into()),
            capacity,
            Box::new(sink),
            Handle::current(),
        );
        (writer, reader)
    }

    async fn read_all(mut reader: tokio::io::DuplexStream) -> String {
        let mut out = String::new();
        reader.read_to_string(&mut out).await.expect("read sink");
        out
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_fifo_and_drain_on_stop() {
        let (writer, reader) = memory_writer(16);
        writer.start();
        assert_eq!(writer.state(), WriterState::Running);

        for i in 0..100 {
            writer.send(format!("line {}\n", i)).await.expect("send");
        }
        writer.stop().await;
        assert_eq!(writer.state(), WriterState::Stopped);

        let expected: String = (0..100).map(|i| format!("line {}\n", i)).collect();
        assert_eq!(read_all(reader).await, expected);
    }

    #[tokio::test]
    async fn test_send_after_stop_is_closed() {
        let (writer, _reader) = memory_writer(4);
        writer.start();
        writer.stop().await;

        let err = writer.send("late\n".into()).await.expect_err("closed");
        assert!(err.is_closed());
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let (writer, reader) = memory_writer(4);
        writer.start();
        writer.send("once\n".into()).await.expect("send");
        writer.stop().await;
        writer.stop().await;
        assert_eq!(read_all(reader).await, "once\n");
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let (writer, reader) = memory_writer(4);
        writer.start();
        writer.start();
        writer.send("a\n".into()).await.expect("send");
        writer.stop().await;
        assert_eq!(read_all(reader).await, "a\n");
    }

    #[tokio::test]
    async fn test_never_started_closes_sink() {
        let (writer, reader) = memory_writer(4);
        writer.stop().await;
        assert_eq!(writer.state(), WriterState::Stopped);
        assert_eq!(read_all(reader).await, "");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_full_queue_applies_backpressure() {
        let (writer, reader) = memory_writer(2);
        let writer = std::sync::Arc::new(writer);

        writer.send("1\n".into()).await.expect("send");
        writer.send("2\n".into()).await.expect("send");
        assert_eq!(writer.queued(), 2);

        let blocked = {
            let writer = std::sync::Arc::clone(&writer);
            tokio::spawn(async move { writer.send("3\n".into()).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!blocked.is_finished());

        writer.start();
        blocked.await.expect("join").expect("send after start");
        writer.stop().await;
        assert_eq!(read_all(reader).await, "1\n2\n3\n");
    }

    #[tokio::test]
    async fn test_write_error_does_not_stop_consumer() {
        let sink = tokio_test::io::Builder::new()
            .write(b"first\n")
            .write_error(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
            .write(b"third\n")
            .build();
        let writer = DestinationWriter::new(
            SinkId::Named("mock".into()),
            4,
            Box::new(sink),
            Handle::current(),
        );
        writer.start();

        for line in ["first\n", "second\n", "third\n"] {
            writer.send(line.to_string()).await.expect("send");
        }
        writer.stop().await;
        assert_eq!(writer.state(), WriterState::Stopped);
    }

    #[tokio::test]
    async fn test_abort_discards_and_closes() {
        let (writer, _reader) = memory_writer(4);
        writer.abort();
        assert_eq!(writer.state(), WriterState::Stopped);
        assert!(writer.send("x\n".into()).await.is_err());
        writer.stop().await;
    }

    #[tokio::test]
    async fn test_abort_running_writer_is_stopped() {
        let (writer, _reader) = memory_writer(4);
        writer.start();
        writer.send("queued\n".into()).await.expect("send");
        assert_eq!(writer.state(), WriterState::Running);

        writer.abort();
        assert_eq!(writer.state(), WriterState::Stopped);
        assert!(writer.send("late\n".into()).await.expect_err("closed").is_closed());

        // Nothing left to await; returns at once.
        tokio::time::timeout(Duration::from_secs(1), writer.stop())
            .await
            .expect("stop after abort returns");
        assert_eq!(writer.state(), WriterState::Stopped);
    }
}
