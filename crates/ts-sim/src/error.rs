use thiserror::Error;
use ts_core::{CoreError, MoteId};
use ts_mote::MoteError;
use ts_net::NetError;
use ts_schedule::ScheduleError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("{what} covers {got} motes but the run has {expected}")]
    MoteCountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("no mote {0} in this run")]
    UnknownMote(MoteId),

    #[error(transparent)]
    Settings(#[from] CoreError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Net(#[from] NetError),

    #[error(transparent)]
    Mote(#[from] MoteError),
}

pub type SimResult<T> = Result<T, SimError>;
