//! `ts-mote` — the per-node protocol stack.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`frame`]   | typed EB / DIO / DATA frames and their JSON wire codec     |
//! | [`tsch`]    | synchronisation state machine driven by EBs                |
//! | [`rpl`]     | neighbor table, objective functions, parent selection      |
//! | [`mote`]    | `Mote`: TSCH + RPL + TX queue + application counters       |
//! | [`action`]  | `Action`, the event payload dispatched to motes            |
//! | [`error`]   | `FrameError`, `MoteError`                                  |
//!
//! Nothing here schedules events or draws delivery outcomes.  Those belong
//! to the simulation context in `ts-sim`, which calls into a `Mote` once it
//! knows a frame arrived.

pub mod action;
pub mod error;
pub mod frame;
pub mod mote;
pub mod rpl;
pub mod tsch;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use action::Action;
pub use error::{FrameError, FrameResult, MoteError};
pub use frame::{Data, DataBody, Dio, DioBody, Eb, EbHeader, MacHeader, Packet, decode, encode};
pub use mote::{DropReason, MAX_HOPS, Mote, MoteConfig, MoteStats, PacketEvent, PacketFate};
pub use rpl::{
    ACCEPTABLE_LOWEST_PDR, MIN_HOP_RANK_INCREASE, Neighbor, NeighborTable, ObjectiveFunction,
    OfKind, PARENT_SWITCH_RANK_THRESHOLD, ParentChange, PreferredParent, Rank, Rpl,
};
pub use tsch::{EbRecord, SyncState, Tsch};
