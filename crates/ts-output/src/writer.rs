//! The `OutputWriter` trait implemented by all backend writers.

use crate::{LogRecord, OutputResult};

/// Trait implemented by the JSON-lines and CSV writers.
///
/// Errors surface through [`OutputObserver::take_error`][crate::OutputObserver::take_error]
/// when the writer is driven by a simulation.
pub trait OutputWriter {
    /// Append one record.  Writers may ignore record kinds they do not store.
    fn write_record(&mut self, record: &LogRecord) -> OutputResult<()>;

    /// Flush and close the underlying file.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
