//! CSV summary backend.
//!
//! Stores only [`LogRecord::MoteSummary`] rows; every other record kind is
//! skipped.  The header row is derived from [`SummaryRow`]'s fields and
//! written before the first row.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{LogRecord, OutputResult};

/// Writes one row per mote per run.
pub struct CsvSummaryWriter {
    rows:     Writer<File>,
    finished: bool,
}

impl CsvSummaryWriter {
    /// Create (or truncate) the CSV file at `path`.
    pub fn create(path: &Path) -> OutputResult<Self> {
        Ok(Self { rows: Writer::from_path(path)?, finished: false })
    }
}

impl OutputWriter for CsvSummaryWriter {
    fn write_record(&mut self, record: &LogRecord) -> OutputResult<()> {
        if let LogRecord::MoteSummary(row) = record {
            self.rows.serialize(row)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.rows.flush()?;
        Ok(())
    }
}
