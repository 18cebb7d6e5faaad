//! Network-subsystem error type.

use thiserror::Error;

use ts_core::{Channel, MoteId};

/// Errors produced by `ts-net`.
#[derive(Debug, Error)]
pub enum NetError {
    #[error("unknown topology strategy `{0}`")]
    UnknownTopology(String),

    #[error("topology strategy `{0}` is not supported")]
    UnsupportedTopology(&'static str),

    #[error("PDR must lie in [0, 1], got {0}")]
    InvalidPdr(f64),

    #[error("{0} is not part of this run")]
    UnknownMote(MoteId),

    #[error("{0} is outside the configured channel range")]
    UnknownChannel(Channel),

    #[error("a link needs two distinct motes, got {0} twice")]
    SelfLink(MoteId),
}

pub type NetResult<T> = Result<T, NetError>;
