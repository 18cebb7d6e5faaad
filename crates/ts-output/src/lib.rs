//! `ts-output` — simulation output writers for the TSCH/RPL mesh simulator.
//!
//! | Writer               | File                          | Content                              |
//! |----------------------|-------------------------------|--------------------------------------|
//! | [`JsonlWriter`]      | `run_<k>.jsonl`               | config header, then one record/line  |
//! | [`CsvSummaryWriter`] | `<combination>_summaries.csv` | one row per mote per run             |
//!
//! Both implement [`OutputWriter`] and are driven by [`OutputObserver`],
//! which implements `ts_sim::SimObserver`.  [`merge_outputs`] concatenates
//! the per-run JSON-lines files of one parameter combination.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ts_output::{JsonlWriter, OutputObserver};
//!
//! let writer = JsonlWriter::create(&path, run_id, "default", &settings)?;
//! let mut obs = OutputObserver::new(writer, run_id);
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() { return Err(e.into()); }
//! ```

pub mod csv;
pub mod error;
pub mod jsonl;
pub mod merge;
pub mod observer;
pub mod record;
pub mod writer;


pub use self::csv::CsvSummaryWriter;
pub use error::{OutputError, OutputResult};
pub use jsonl::JsonlWriter;
pub use merge::merge_outputs;
pub use observer::OutputObserver;
pub use record::{LogRecord, SummaryRow};
pub use writer::OutputWriter;
