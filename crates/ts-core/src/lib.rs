//! `ts-core` — foundational types for the TSCH/RPL mesh simulator.
//!
//! This crate is a dependency of every other `ts-*` crate.  It has no `ts-*`
//! dependencies and only a handful of external ones (`rand`, `thiserror`,
//! `serde`, `serde_json`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `MoteId`, `MacAddr`, `Channel`                        |
//! | [`time`]        | `Asn`, `SlotClock`                                    |
//! | [`rng`]         | `MoteRng` (per-mote), `SimRng` (per-run)              |
//! | [`settings`]    | `Settings`, `ConfigFile`, sweep expansion             |
//! | [`error`]       | `CoreError`, `CoreResult`                             |

pub mod error;
pub mod ids;
pub mod rng;
pub mod settings;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use ids::{Channel, MacAddr, MoteId};
pub use rng::{MoteRng, SimRng};
pub use settings::{Combination, ConfigFile, Settings};
pub use time::{Asn, SlotClock};
