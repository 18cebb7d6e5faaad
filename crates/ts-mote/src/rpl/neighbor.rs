//! RPL neighbor table.

use std::collections::BTreeMap;

use ts_core::{Asn, Channel, MacAddr, MoteId};

use super::Rank;

/// Everything a mote knows about one DIO-sending neighbor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub mac:        MacAddr,
    pub mote:       MoteId,
    /// Rank from the neighbor's latest DIO.
    pub rank:       Rank,
    /// Current ETX estimate toward the neighbor (`1 / pdr`).
    pub etx:        f64,
    pub tx_count:   u32,
    pub ack_count:  u32,
    /// Link quality at or above the acceptable floor.
    pub reachable:  bool,
    /// Last heard advertising a rank at or above ours, so it may route
    /// through us.  Never a parent candidate until it advertises lower.
    pub downstream: bool,
    /// Channel last used with this neighbor.
    pub channel:    Channel,
    pub last_heard: Asn,
}

impl Neighbor {
    pub fn new(mac: MacAddr, mote: MoteId, rank: Rank, channel: Channel, now: Asn) -> Self {
        Self {
            mac,
            mote,
            rank,
            etx: 1.0,
            tx_count: 0,
            ack_count: 0,
            reachable: true,
            downstream: false,
            channel,
            last_heard: now,
        }
    }

    /// Fraction of unicast attempts that were acknowledged; 1.0 before the
    /// first attempt.
    pub fn ack_ratio(&self) -> f64 {
        if self.tx_count == 0 {
            1.0
        } else {
            f64::from(self.ack_count) / f64::from(self.tx_count)
        }
    }
}

/// Neighbors keyed by MAC address.  Ordered so parent selection breaks ties
/// the same way on every run.
#[derive(Clone, Debug, Default)]
pub struct NeighborTable {
    entries: BTreeMap<MacAddr, Neighbor>,
}

impl NeighborTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, mac: MacAddr) -> Option<&Neighbor> {
        self.entries.get(&mac)
    }

    pub fn get_mut(&mut self, mac: MacAddr) -> Option<&mut Neighbor> {
        self.entries.get_mut(&mac)
    }

    /// Record a DIO from `mac`: refresh an existing entry or create one.
    pub fn upsert(&mut self, mac: MacAddr, mote: MoteId, rank: Rank, channel: Channel, now: Asn) -> &mut Neighbor {
        let entry = self
            .entries
            .entry(mac)
            .or_insert_with(|| Neighbor::new(mac, mote, rank, channel, now));
        entry.rank = rank;
        entry.channel = channel;
        entry.last_heard = now;
        entry
    }

    pub fn remove(&mut self, mac: MacAddr) -> Option<Neighbor> {
        self.entries.remove(&mac)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Neighbor> {
        self.entries.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Neighbor> {
        self.entries.values_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
