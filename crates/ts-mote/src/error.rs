use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{kind} frame is missing `{field}`")]
    MissingAddress {
        kind:  &'static str,
        field: &'static str,
    },
}

pub type FrameResult<T> = Result<T, FrameError>;

#[derive(Debug, Error)]
pub enum MoteError {
    #[error("unknown objective function `{0}`")]
    UnknownObjectiveFunction(String),
}
