//! Configuration-level error type.
//!
//! Errors here are fatal at startup: they are reported once and no run is
//! attempted.  Protocol-level anomalies never surface as `CoreError`.

use thiserror::Error;

/// The error type for settings loading and validation.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid value for `{field}`: {reason}")]
    InvalidSetting {
        field:  &'static str,
        reason: String,
    },

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `ts-core`.
pub type CoreResult<T> = Result<T, CoreError>;
