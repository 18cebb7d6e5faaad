//! TSCH synchronisation sublayer.
//!
//! A mote boots unsynchronised and listens.  The first valid EB it hears
//! gives it the network's slot timing and a join metric; from then on it is
//! synchronised for the rest of the run.  Later EBs only refresh the
//! per-neighbor beacon bookkeeping.
//!
//! ```text
//! UNSYNCHRONIZED ──EB──▶ SYNCHRONIZED
//!                         │  ▲
//!                         └──┘ EB (recorded, no transition)
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;
use ts_core::{Asn, MacAddr};

use crate::frame::Eb;

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncState {
    Unsynchronized,
    Synchronized,
}

/// What a mote remembers about a beaconing neighbor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EbRecord {
    pub join_metric: u16,
    pub last_heard:  Asn,
    pub heard:       u32,
}

/// Per-mote synchronisation state.
#[derive(Clone, Debug)]
pub struct Tsch {
    state:            SyncState,
    slotframe_length: u64,
    synced_at:        Option<Asn>,
    /// Neighbor whose EB synchronised this mote, with the metric it carried.
    sync_source:      Option<(MacAddr, u16)>,
    beacons:          BTreeMap<MacAddr, EbRecord>,
}

impl Tsch {
    pub fn new(slotframe_length: u64) -> Self {
        Self {
            state: SyncState::Unsynchronized,
            slotframe_length,
            synced_at: None,
            sync_source: None,
            beacons: BTreeMap::new(),
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    #[inline]
    pub fn is_synchronized(&self) -> bool {
        self.state == SyncState::Synchronized
    }

    pub fn synced_at(&self) -> Option<Asn> {
        self.synced_at
    }

    pub fn sync_source(&self) -> Option<(MacAddr, u16)> {
        self.sync_source
    }

    pub fn slotframe_length(&self) -> u64 {
        self.slotframe_length
    }

    /// Beacon bookkeeping keyed by sender.
    pub fn beacons(&self) -> &BTreeMap<MacAddr, EbRecord> {
        &self.beacons
    }

    /// Synchronise without an EB.  The DAG root defines the timing itself.
    pub fn force_synchronize(&mut self, now: Asn) {
        if !self.is_synchronized() {
            self.state = SyncState::Synchronized;
            self.synced_at = Some(now);
        }
    }

    /// Process a received EB.  Returns `true` only on the transition to
    /// synchronised.  EBs without a source address are ignored.
    pub fn receive_eb(&mut self, eb: &Eb, now: Asn) -> bool {
        let Some(src) = eb.mac.src_mac else {
            debug!("EB without source address dropped");
            return false;
        };
        let record = self.beacons.entry(src).or_insert(EbRecord {
            join_metric: eb.mac.join_metric,
            last_heard:  now,
            heard:       0,
        });
        record.join_metric = eb.mac.join_metric;
        record.last_heard = now;
        record.heard += 1;

        if self.is_synchronized() {
            return false;
        }
        self.state = SyncState::Synchronized;
        self.synced_at = Some(now);
        self.sync_source = Some((src, eb.mac.join_metric));
        true
    }

    /// Build an unaddressed EB advertising `join_metric`.
    pub fn create_eb(&self, join_metric: u16) -> Eb {
        Eb::new(join_metric)
    }

    /// Back to the boot state.
    pub fn reset(&mut self) {
        *self = Tsch::new(self.slotframe_length);
    }
}
