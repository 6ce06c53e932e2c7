//! Appender implementations and the destination writers behind them

pub mod destination;
pub mod queued;
pub mod sink;

pub use destination::{DestinationWriter, WriterState};
pub use queued::QueuedAppender;
pub use sink::{ConsoleTarget, SinkHandle, SinkId};

pub use crate::core::Appender;
