//! JSON-lines output backend.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use ts_core::Settings;

use crate::writer::OutputWriter;
use crate::{LogRecord, OutputResult};

/// Writes one JSON record per line, starting with the run's config record.
pub struct JsonlWriter {
    out:      BufWriter<File>,
    path:     PathBuf,
    finished: bool,
}

impl JsonlWriter {
    /// Create (or truncate) `path` and write the config header.
    pub fn create(path: &Path, run_id: u32, combination: &str, settings: &Settings) -> OutputResult<Self> {
        let mut writer = Self {
            out:      BufWriter::new(File::create(path)?),
            path:     path.to_path_buf(),
            finished: false,
        };
        writer.write_record(&LogRecord::Config {
            run_id,
            combination: combination.to_owned(),
            settings:    settings.clone(),
        })?;
        Ok(writer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputWriter for JsonlWriter {
    fn write_record(&mut self, record: &LogRecord) -> OutputResult<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.out.flush()?;
        Ok(())
    }
}
