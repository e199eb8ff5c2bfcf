use crate::record::LogRecord;
use std::sync::{Mutex, MutexGuard};

/// Error reported by a [`LogSink`].
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("log sink unavailable: {0}")]
    Unavailable(String),
}

/// Destination for [`LogRecord`]s: the host's emission path.
///
/// The logger calls `send` exactly once per log call, synchronously, with a
/// record carrying the augmented fields, the interpolated message and the
/// residual arguments. Failures are reported by the caller and never
/// propagated into the logging call site.
pub trait LogSink: Send + Sync {
    /// Emit a single record.
    ///
    /// **Returns**
    /// - `Ok(())` if the record was accepted.
    /// - `Err(..)` if the destination rejected it.
    fn send(&self, record: &LogRecord) -> Result<(), SinkError>;

    /// Flush any buffered records.
    ///
    /// Default implementation is a no-op.
    fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// A sink that simply drops all records.
///
/// Useful for measuring the overhead of templating itself without any I/O.
#[derive(Clone, Debug, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn send(&self, _record: &LogRecord) -> Result<(), SinkError> {
        Ok(())
    }
}

/// A sink that keeps every record in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records received so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().clone()
    }

    /// Remove and return the records received so far.
    pub fn take(&self) -> Vec<LogRecord> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogRecord>> {
        // A panic while holding the lock cannot leave a Vec half-pushed.
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LogSink for MemorySink {
    fn send(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.lock().push(record.clone());
        Ok(())
    }
}
