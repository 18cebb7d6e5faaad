//! `ts-sim` — the run context of the TSCH/RPL mesh simulator.
//!
//! # Event loop
//!
//! ```text
//! while let Some(event) = scheduler.pop_next_until(end):
//!   ① Resolve  — look up the target mote; unknown or inactive → no-op.
//!   ② Act      — Boot | SendEb | SendDio | GeneratePacket | TxData
//!   ③ Radio    — broadcasts: one Bernoulli draw per receiver;
//!                unicasts:   frame draw src→dst, then ACK draw dst→src.
//!   ④ Follow-up — periodic timers and retransmissions are scheduled back
//!                into the scheduler; nothing blocks.
//! ```
//!
//! All run state (settings, scheduler, topology, connectivity, motes) lives
//! in one [`Sim`] value.  Dropping it or calling [`Sim::teardown`] leaves
//! nothing behind for the next run.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ts_core::Settings;
//! use ts_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(Settings::default()).build()?;
//! let summary = sim.run(&mut NoopObserver)?;
//! println!("{} of {} packets delivered", summary.delivered, summary.generated);
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;
pub mod summary;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Sim;
pub use summary::{MoteSummary, RunSummary};
