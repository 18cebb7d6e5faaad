//! Concatenation of per-run output files.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::{OutputError, OutputResult};

/// Concatenate the JSON-lines files in `sources` into `dest`.
///
/// Every source must start with a config record.  Only the first source's
/// header is kept, so `dest` carries exactly one.  Sources are deleted once
/// `dest` is flushed.  Returns the number of lines written.
pub fn merge_outputs(sources: &[PathBuf], dest: &Path) -> OutputResult<u64> {
    if sources.is_empty() {
        return Err(OutputError::NoSources);
    }

    let mut out = BufWriter::new(File::create(dest)?);
    let mut written = 0u64;
    for (i, source) in sources.iter().enumerate() {
        let mut lines = BufReader::new(File::open(source)?).lines();
        let header = match lines.next() {
            Some(line) => line?,
            None => return Err(OutputError::MissingHeader(source.clone())),
        };
        if !is_config_line(&header) {
            return Err(OutputError::MissingHeader(source.clone()));
        }
        if i == 0 {
            writeln!(out, "{header}")?;
            written += 1;
        }
        for line in lines {
            writeln!(out, "{}", line?)?;
            written += 1;
        }
    }
    out.flush()?;

    for source in sources {
        fs::remove_file(source)?;
    }
    debug!(dest = %dest.display(), sources = sources.len(), lines = written, "outputs merged");
    Ok(written)
}

fn is_config_line(line: &str) -> bool {
    serde_json::from_str::<Value>(line)
        .is_ok_and(|v| v.get("type").and_then(Value::as_str) == Some("config"))
}
