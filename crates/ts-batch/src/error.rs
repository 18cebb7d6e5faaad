use thiserror::Error;
use ts_core::CoreError;
use ts_mote::MoteError;
use ts_net::NetError;
use ts_output::OutputError;
use ts_sim::SimError;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("combination `{combination}`: {source}")]
    Topology {
        combination: String,
        #[source]
        source:      NetError,
    },

    #[error("combination `{combination}`: {source}")]
    Objective {
        combination: String,
        #[source]
        source:      MoteError,
    },

    #[error("{requested} workers requested but only {available} available")]
    TooManyWorkers { requested: usize, available: usize },

    #[error("could not start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("run {run} of `{combination}` failed: {source}")]
    Run {
        combination: String,
        run:         u32,
        #[source]
        source:      Box<BatchError>,
    },

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type BatchResult<T> = Result<T, BatchError>;
