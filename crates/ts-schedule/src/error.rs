use thiserror::Error;

use ts_core::Asn;

#[derive(Debug, Error)]
pub enum ScheduleError {
    /// An event was scheduled in the past.  This is an internal bug: it would
    /// silently corrupt dispatch order, so the run must abort.
    #[error("cannot schedule at {requested}: clock is already at {now}")]
    InvalidTime { requested: Asn, now: Asn },
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
