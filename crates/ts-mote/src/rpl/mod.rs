//! RPL routing state: neighbor table, own rank and preferred parent.
//!
//! # Parent selection
//!
//! Re-evaluated on every accepted DIO and on every link-quality update that
//! leaves the link usable.  For each neighbor `n`:
//!
//! ```text
//! quality(n) = of.link_quality(self → n)
//! path(n)    = n.rank + of.rank_increase(quality(n))
//! ```
//!
//! `n` is a candidate iff `quality(n) ≥ ACCEPTABLE_LOWEST_PDR`,
//! `n.rank < own current rank`, and `n` was not last heard at or below us
//! (a neighbor that was deeper than us may route through us, even after our
//! own rank rises past its stale entry).  The best candidate replaces the
//! current parent only if its path is lower by more than
//! [`PARENT_SWITCH_RANK_THRESHOLD`]; ties keep the current parent, then the
//! lowest MAC wins.
//!
//! Only the root advertises [`Rank::ROOT`], and every other mote sits at
//! least one [`MIN_HOP_RANK_INCREASE`] below it.  DIOs outside those bounds
//! are forged or replayed and are dropped before touching the table.

mod neighbor;
mod of;
mod rank;

use serde::Serialize;
use tracing::debug;
use ts_core::{Asn, Channel, MacAddr, MoteId};
use ts_net::LinkQuality;

use crate::frame::Dio;

pub use neighbor::{Neighbor, NeighborTable};
pub use of::{ACCEPTABLE_LOWEST_PDR, Of0, OfBestLinkPdr, OfKind, ObjectiveFunction};
pub use rank::{MIN_HOP_RANK_INCREASE, Rank};

/// Minimum path-rank improvement before a mote leaves its current parent.
pub const PARENT_SWITCH_RANK_THRESHOLD: u16 = MIN_HOP_RANK_INCREASE / 2;

/// Reference to the neighbor-table entry chosen as next hop.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct PreferredParent {
    pub mote: MoteId,
    pub mac:  MacAddr,
}

/// A change of preferred parent, reported to the simulation.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
pub struct ParentChange {
    pub old:  Option<PreferredParent>,
    pub new:  Option<PreferredParent>,
    /// Own rank after the change.
    pub rank: Rank,
}

/// Per-mote RPL instance.
pub struct Rpl {
    own:              MoteId,
    is_root:          bool,
    rank:             Rank,
    preferred_parent: Option<PreferredParent>,
    neighbors:        NeighborTable,
    of:               Box<dyn ObjectiveFunction>,
}

impl Rpl {
    pub fn new(own: MoteId, of: Box<dyn ObjectiveFunction>) -> Self {
        let is_root = own.is_root();
        Self {
            own,
            is_root,
            rank: if is_root { Rank::ROOT } else { Rank::INFINITE },
            preferred_parent: None,
            neighbors: NeighborTable::new(),
            of,
        }
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn preferred_parent(&self) -> Option<PreferredParent> {
        self.preferred_parent
    }

    /// Root, or attached to the DODAG through a parent.
    pub fn has_rank(&self) -> bool {
        self.is_root || self.preferred_parent.is_some()
    }

    pub fn neighbors(&self) -> &NeighborTable {
        &self.neighbors
    }

    pub fn of_kind(&self) -> OfKind {
        self.of.kind()
    }

    /// Unaddressed DIO carrying the rank this mote currently advertises.
    /// Motes without a route advertise [`Rank::INFINITE`].
    pub fn create_dio(&self) -> Dio {
        Dio::new(if self.has_rank() { self.rank } else { Rank::INFINITE })
    }

    /// Handle a DIO heard on `channel`.
    ///
    /// Malformed or implausible DIOs are dropped without touching the table.
    pub fn receive_dio(
        &mut self,
        dio:     &Dio,
        channel: Channel,
        now:     Asn,
        link:    &dyn LinkQuality,
    ) -> Option<ParentChange> {
        let Some(src) = dio.mac.src_mac else {
            debug!(mote = %self.own, "DIO without source address dropped");
            return None;
        };
        let Some(peer) = src.mote_id() else {
            debug!(mote = %self.own, %src, "DIO from unknown address dropped");
            return None;
        };
        if peer == self.own {
            debug!(mote = %self.own, "own DIO dropped");
            return None;
        }
        let rank = dio.app.rank;
        if !plausible_rank(peer, rank) {
            debug!(mote = %self.own, %peer, %rank, "DIO with implausible rank dropped");
            return None;
        }

        if rank.is_infinite() {
            // The advertiser lost its route: it is no longer a candidate.
            self.neighbors.remove(src);
            if self.preferred_parent.is_some_and(|p| p.mac == src) {
                let old = self.preferred_parent.take();
                self.rank = Rank::INFINITE;
                let reselected = self.reselect(link);
                return Some(ParentChange {
                    old,
                    new:  reselected.and_then(|c| c.new),
                    rank: self.rank,
                });
            }
            return None;
        }

        let from_parent = self.preferred_parent.is_some_and(|p| p.mac == src);
        let own_rank = self.rank;
        let entry = self.neighbors.upsert(src, peer, rank, channel, now);
        entry.downstream = !from_parent && rank >= own_rank;
        self.reselect(link)
    }

    /// Fold the outcome of one unicast attempt toward `mac` into the
    /// neighbor's link estimate.
    ///
    /// If the link drops below [`ACCEPTABLE_LOWEST_PDR`] and `mac` was the
    /// preferred parent, the parent is cleared and not replaced until the
    /// next re-evaluation.
    pub fn update_etx(
        &mut self,
        channel: Channel,
        mac:     MacAddr,
        acked:   bool,
        link:    &dyn LinkQuality,
    ) -> Option<ParentChange> {
        let Some(neighbor) = self.neighbors.get_mut(mac) else {
            debug!(mote = %self.own, %mac, "tx outcome for unknown neighbor ignored");
            return None;
        };
        neighbor.tx_count += 1;
        if acked {
            neighbor.ack_count += 1;
        }
        neighbor.channel = channel;
        let quality = self.of.link_quality(self.own, neighbor, link);
        refresh_estimate(neighbor, quality);

        if self.is_root {
            return None;
        }
        if !neighbor.reachable {
            if self.preferred_parent.is_some_and(|p| p.mac == mac) {
                let old = self.preferred_parent.take();
                self.rank = Rank::INFINITE;
                debug!(mote = %self.own, %mac, quality, "preferred parent link below floor; detached");
                return Some(ParentChange { old, new: None, rank: self.rank });
            }
            return None;
        }
        self.reselect(link)
    }

    /// Forget every neighbor and route.
    pub fn reset(&mut self) {
        self.neighbors.clear();
        self.preferred_parent = None;
        self.rank = if self.is_root { Rank::ROOT } else { Rank::INFINITE };
    }

    fn reselect(&mut self, link: &dyn LinkQuality) -> Option<ParentChange> {
        if self.is_root {
            return None;
        }

        // Refresh every estimate first so selection reads a consistent table.
        for neighbor in self.neighbors.iter_mut() {
            let quality = self.of.link_quality(self.own, neighbor, link);
            refresh_estimate(neighbor, quality);
        }

        let path_rank = |n: &Neighbor| -> u32 {
            let quality = 1.0 / n.etx;
            u32::from(n.rank.0) + u32::from(self.of.rank_increase(quality))
        };

        let old = self.preferred_parent;
        let current = old
            .and_then(|p| self.neighbors.get(p.mac))
            .filter(|n| n.reachable && !n.rank.is_infinite())
            .map(|n| (*n, path_rank(n)))
            .filter(|&(_, path)| path < u32::from(Rank::INFINITE.0));
        let own_rank = current.map_or(u32::from(Rank::INFINITE.0), |(_, path)| path);

        let mut best: Option<(Neighbor, u32)> = None;
        for n in self.neighbors.iter() {
            if !n.reachable || n.downstream || n.rank.is_infinite() || u32::from(n.rank.0) >= own_rank {
                continue;
            }
            let path = path_rank(n);
            if path >= u32::from(Rank::INFINITE.0) {
                continue;
            }
            if best.is_none_or(|(_, best_path)| path < best_path) {
                best = Some((*n, path));
            }
        }

        let chosen = match (current, best) {
            (Some((cur, cur_path)), Some((cand, cand_path)))
                if cand.mac != cur.mac
                    && cand_path + u32::from(PARENT_SWITCH_RANK_THRESHOLD) < cur_path =>
            {
                Some((cand, cand_path))
            }
            (Some(cur), _) => Some(cur),
            (None, best) => best,
        };

        let new = chosen.map(|(n, _)| PreferredParent { mote: n.mote, mac: n.mac });
        self.rank = chosen.map_or(Rank::INFINITE, |(_, path)| Rank(path as u16));
        self.preferred_parent = new;

        if new == old {
            return None;
        }
        debug!(
            mote = %self.own,
            old = ?old.map(|p| p.mote),
            new = ?new.map(|p| p.mote),
            rank = %self.rank,
            "preferred parent changed"
        );
        Some(ParentChange { old, new, rank: self.rank })
    }
}

/// Rank bounds an honest advertiser can be in.  [`Rank::INFINITE`] (route
/// poisoning) is accepted from any mote but the root.
fn plausible_rank(peer: MoteId, rank: Rank) -> bool {
    if peer.is_root() {
        rank == Rank::ROOT
    } else {
        rank.is_infinite() || rank >= Rank::ROOT.plus(MIN_HOP_RANK_INCREASE)
    }
}

fn refresh_estimate(neighbor: &mut Neighbor, quality: f64) {
    let quality = quality.clamp(0.0, 1.0);
    neighbor.etx = if quality > 0.0 { 1.0 / quality } else { f64::INFINITY };
    neighbor.reachable = quality >= ACCEPTABLE_LOWEST_PDR;
}
