//! `ts-batch` — runs a parameter sweep.
//!
//! ```text
//! ConfigFile ──expand──▶ combinations ──× num_runs──▶ RunSpec list
//!                                                        │
//!                     rayon pool (num_workers threads) ◀─┘
//!                     each run: own Sim, own run_<k>.jsonl
//!                                                        │
//!            per combination: merge → <id>.jsonl, <id>_summaries.csv
//! ```
//!
//! Runs share no mutable state.  The first failing run aborts the batch
//! and nothing is merged.

pub mod error;
pub mod plan;
pub mod runner;


pub use error::{BatchError, BatchResult};
pub use plan::{BatchPlan, RunSpec};
pub use runner::{BatchReport, RunOutcome, available_workers, check_workers, run_batch, run_one};
