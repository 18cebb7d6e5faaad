//! Error types for ts-output.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when writing or merging run output.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} does not start with a config record")]
    MissingHeader(PathBuf),

    #[error("nothing to merge")]
    NoSources,
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
