//! `ts-schedule` — the discrete-event scheduler.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`scheduler`] | `EventScheduler<A>`, `Event<A>`, `EventKey`               |
//! | [`error`]     | `ScheduleError`, `ScheduleResult<T>`                      |
//!
//! # Ordering model (summary)
//!
//! ```text
//! key      = (asn, seq)        seq assigned at insertion, never reused
//! dispatch = ascending key     earliest slot first, FIFO within a slot
//! now      = key.asn of the last popped event (never decreases)
//! ```
//!
//! The action type `A` is opaque to the scheduler; the simulation decides
//! what an action means and whether its target still exists.

pub mod error;
pub mod scheduler;

#[cfg(test)]
mod tests;

pub use error::{ScheduleError, ScheduleResult};
pub use scheduler::{Event, EventKey, EventScheduler};
