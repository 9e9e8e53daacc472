//! Log sinks consumed by the mirror core
//!
//! The core never decides where its messages go. Every mutating action,
//! type conflict and per-entry failure is handed to a [`LogSink`].

use chrono::Local;
use parking_lot::Mutex;
use tracing::{error, info, warn};

/// Timestamp layout shared by the durable log and [`MemorySink`]
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only destination for mirror log lines
pub trait LogSink: Send + Sync {
    /// One mutating action
    fn log(&self, message: &str);

    /// A recovered condition that discarded replica data (type conflicts)
    fn warn(&self, message: &str) {
        self.log(message);
    }

    /// A failure that left an entry unsynchronized
    fn error(&self, message: &str) {
        self.log(message);
    }
}

/// Production sink: forwards to `tracing`, whose subscriber stamps and
/// fans out every line to the console and the durable log file.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, message: &str) {
        info!(target: "dirmirror::mirror", "{}", message);
    }

    fn warn(&self, message: &str) {
        warn!(target: "dirmirror::mirror", "{}", message);
    }

    fn error(&self, message: &str) {
        error!(target: "dirmirror::mirror", "{}", message);
    }
}

/// In-memory sink producing `[timestamp] message` lines
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line logged so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    /// Drain the collected lines
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }

    fn push(&self, message: &str) {
        let line = format!("[{}] {}", Local::now().format(TIMESTAMP_FORMAT), message);
        self.lines.lock().push(line);
    }
}

impl LogSink for MemorySink {
    fn log(&self, message: &str) {
        self.push(message);
    }
}

impl<T: LogSink + ?Sized> LogSink for std::sync::Arc<T> {
    fn log(&self, message: &str) {
        (**self).log(message)
    }

    fn warn(&self, message: &str) {
        (**self).warn(message)
    }

    fn error(&self, message: &str) {
        (**self).error(message)
    }
}
