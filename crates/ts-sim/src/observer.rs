//! Simulation observer trait for tracing runs and collecting output.

use ts_core::{Asn, MoteId};
use ts_mote::{Action, PacketEvent, ParentChange};

use crate::RunSummary;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] as events are
/// dispatched.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — delivery counter
///
/// ```rust,ignore
/// struct Delivered(u32);
///
/// impl SimObserver for Delivered {
///     fn on_packet(&mut self, event: &PacketEvent) {
///         if event.fate == PacketFate::Delivered {
///             self.0 += 1;
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called before each event's action runs, including events that turn
    /// out to be no-ops.
    fn on_dispatch(&mut self, _asn: Asn, _target: MoteId, _action: Action) {}

    /// Called when a mote becomes synchronised (the root at boot, others on
    /// their first EB).
    fn on_sync(&mut self, _asn: Asn, _mote: MoteId) {}

    /// Called whenever a mote's preferred parent changes.
    fn on_parent_change(&mut self, _asn: Asn, _mote: MoteId, _change: &ParentChange) {}

    /// Called when an application packet is generated, delivered or dropped.
    fn on_packet(&mut self, _event: &PacketEvent) {}

    /// Called once when the run stops.
    fn on_run_end(&mut self, _summary: &RunSummary) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
