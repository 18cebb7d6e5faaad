//! End-of-run statistics.

use serde::Serialize;
use ts_core::{Asn, MoteId};
use ts_mote::{Mote, MoteStats, Rank};

/// Final state of one mote.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MoteSummary {
    pub mote:         MoteId,
    pub x:            f64,
    pub y:            f64,
    pub active:       bool,
    pub synchronized: bool,
    pub joined:       bool,
    pub synced_at:    Option<Asn>,
    pub rank:         Rank,
    pub parent:       Option<MoteId>,
    pub neighbors:    usize,
    pub stats:        MoteStats,
}

impl From<&Mote> for MoteSummary {
    fn from(mote: &Mote) -> Self {
        Self {
            mote:         mote.id,
            x:            mote.position.0,
            y:            mote.position.1,
            active:       mote.is_active(),
            synchronized: mote.is_synchronized(),
            joined:       mote.is_joined(),
            synced_at:    mote.tsch.synced_at(),
            rank:         if mote.rpl.has_rank() { mote.rpl.rank() } else { Rank::INFINITE },
            parent:       mote.rpl.preferred_parent().map(|p| p.mote),
            neighbors:    mote.rpl.neighbors().len(),
            stats:        mote.stats(),
        }
    }
}

/// What [`Sim::run`](crate::Sim::run) returns.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    /// Virtual time of the last dispatched event.
    pub end:       Asn,
    /// Events dispatched during the run.
    pub events:    u64,
    pub joined:    u32,
    pub generated: u32,
    pub delivered: u32,
    pub dropped:   u32,
    pub motes:     Vec<MoteSummary>,
}

impl RunSummary {
    pub fn from_motes(end: Asn, events: u64, motes: Vec<MoteSummary>) -> Self {
        let sum = |f: fn(&MoteStats) -> u32| motes.iter().map(|m| f(&m.stats)).sum::<u32>();
        Self {
            end,
            events,
            joined:    motes.iter().filter(|m| m.joined).count() as u32,
            generated: sum(|s| s.generated),
            delivered: sum(|s| s.delivered),
            dropped:   sum(|s| s.dropped),
            motes,
        }
    }

    /// Delivered over generated; 0 when nothing was generated.
    ///
    /// Link-layer retransmissions after a lost ACK can deliver a packet
    /// twice, so this can exceed 1 on very lossy links.
    pub fn delivery_ratio(&self) -> f64 {
        if self.generated == 0 {
            0.0
        } else {
            f64::from(self.delivered) / f64::from(self.generated)
        }
    }
}
