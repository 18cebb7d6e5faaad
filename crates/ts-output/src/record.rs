//! Records written to run output.
//!
//! One JSON object per line, discriminated by `type`:
//!
//! ```text
//! {"type":"config","run_id":0,"combination":"default","settings":{…}}
//! {"type":"sync","asn":212,"mote":3}
//! {"type":"parent_change","asn":220,"mote":3,"old":null,"new":0,"rank":512}
//! {"type":"packet","asn":525,"mote":0,"src":3,"dst":1,"seq":0,"hops":1,"fate":{"fate":"delivered"}}
//! {"type":"run_end","asn":22000,"events":1841,"joined":5,…}
//! {"type":"mote_summary","run_id":0,"mote":3,…}
//! ```

use serde::Serialize;
use ts_core::{Asn, MoteId, Settings};
use ts_mote::{PacketFate, Rank};
use ts_sim::MoteSummary;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogRecord {
    /// Leading record of every run file.
    Config {
        run_id:      u32,
        combination: String,
        settings:    Settings,
    },
    Dispatch {
        asn:    Asn,
        mote:   MoteId,
        action: &'static str,
    },
    Sync {
        asn:  Asn,
        mote: MoteId,
    },
    ParentChange {
        asn:  Asn,
        mote: MoteId,
        old:  Option<MoteId>,
        new:  Option<MoteId>,
        rank: Rank,
    },
    Packet {
        asn:  Asn,
        mote: MoteId,
        src:  MoteId,
        dst:  MoteId,
        seq:  u32,
        hops: u8,
        fate: PacketFate,
    },
    RunEnd {
        asn:       Asn,
        events:    u64,
        joined:    u32,
        generated: u32,
        delivered: u32,
        dropped:   u32,
    },
    MoteSummary(SummaryRow),
}

impl LogRecord {
    pub fn is_config(&self) -> bool {
        matches!(self, LogRecord::Config { .. })
    }
}

/// Flat per-mote row, shared by the JSON-lines log and the CSV summary.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SummaryRow {
    pub run_id:       u32,
    pub mote:         u32,
    pub x:            f64,
    pub y:            f64,
    pub active:       bool,
    pub synchronized: bool,
    pub joined:       bool,
    pub synced_at:    Option<u64>,
    pub rank:         u16,
    pub parent:       Option<u32>,
    pub neighbors:    usize,
    pub generated:    u32,
    pub delivered:    u32,
    pub dropped:      u32,
    pub forwarded:    u32,
    pub tx_attempts:  u32,
    pub tx_acked:     u32,
    pub eb_rx:        u32,
    pub dio_rx:       u32,
}

impl SummaryRow {
    pub fn new(run_id: u32, mote: &MoteSummary) -> Self {
        let stats = &mote.stats;
        Self {
            run_id,
            mote:         mote.mote.0,
            x:            mote.x,
            y:            mote.y,
            active:       mote.active,
            synchronized: mote.synchronized,
            joined:       mote.joined,
            synced_at:    mote.synced_at.map(|a| a.0),
            rank:         mote.rank.0,
            parent:       mote.parent.map(|p| p.0),
            neighbors:    mote.neighbors,
            generated:    stats.generated,
            delivered:    stats.delivered,
            dropped:      stats.dropped,
            forwarded:    stats.forwarded,
            tx_attempts:  stats.tx_attempts,
            tx_acked:     stats.tx_acked,
            eb_rx:        stats.eb_rx,
            dio_rx:       stats.dio_rx,
        }
    }
}
