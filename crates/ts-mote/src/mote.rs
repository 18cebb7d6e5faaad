//! The per-node protocol stack.
//!
//! A `Mote` owns its TSCH and RPL state plus a small FIFO of application
//! frames waiting for the shared cell.  It never touches the scheduler or
//! the radio: the simulation decides when a mote acts and whether a frame
//! arrived, then calls into the methods here.

use std::collections::VecDeque;

use serde::Serialize;
use tracing::debug;
use ts_core::{Asn, Channel, MacAddr, MoteId, MoteRng};
use ts_net::LinkQuality;

use crate::frame::{Data, DataBody, Dio, Eb};
use crate::rpl::{OfKind, ParentChange, Rpl};
use crate::tsch::Tsch;

/// Frames carrying more hops than this are assumed to be looping.
pub const MAX_HOPS: u8 = 32;

/// Static per-mote parameters, shared by every mote of a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoteConfig {
    pub slotframe_length: u64,
    pub tx_queue_size:    usize,
    pub max_tx_retries:   u8,
    pub objective:        OfKind,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    QueueFull,
    NoRoute,
    MaxRetries,
    HopLimit,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(tag = "fate", content = "reason", rename_all = "snake_case")]
pub enum PacketFate {
    Generated,
    Delivered,
    Dropped(DropReason),
}

/// Something that happened to an application packet at `mote`.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
pub struct PacketEvent {
    pub mote: MoteId,
    pub asn:  Asn,
    pub body: DataBody,
    pub fate: PacketFate,
}

/// Running counters, reported in per-run summaries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MoteStats {
    pub generated:   u32,
    pub delivered:   u32,
    pub dropped:     u32,
    pub forwarded:   u32,
    pub tx_attempts: u32,
    pub tx_acked:    u32,
    pub eb_rx:       u32,
    pub dio_rx:      u32,
}

#[derive(Clone, Copy, Debug)]
struct Queued {
    body:     DataBody,
    attempts: u8,
}

pub struct Mote {
    pub id:       MoteId,
    pub mac:      MacAddr,
    /// Position in the deployment area (metres).  Informational only.
    pub position: (f64, f64),
    pub tsch:     Tsch,
    pub rpl:      Rpl,
    active:       bool,
    config:       MoteConfig,
    queue:        VecDeque<Queued>,
    rng:          MoteRng,
    next_seq:     u32,
    stats:        MoteStats,
}

impl Mote {
    pub fn new(id: MoteId, config: MoteConfig, rng: MoteRng) -> Self {
        Self {
            id,
            mac: id.mac(),
            position: (0.0, 0.0),
            tsch: Tsch::new(config.slotframe_length),
            rpl: Rpl::new(id, config.objective.build()),
            active: true,
            config,
            queue: VecDeque::with_capacity(config.tx_queue_size),
            rng,
            next_seq: 0,
            stats: MoteStats::default(),
        }
    }

    /// Power on.  The root synchronises itself and is joined immediately;
    /// everyone else starts listening for EBs.  Returns whether the mote is
    /// joined afterwards.
    pub fn boot(&mut self, now: Asn) -> bool {
        if self.rpl.is_root() {
            self.tsch.force_synchronize(now);
        }
        self.is_joined()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Model a node failure.  The mote stops sending and receiving; pending
    /// events for it become no-ops.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.queue.clear();
    }

    pub fn is_root(&self) -> bool {
        self.rpl.is_root()
    }

    pub fn is_synchronized(&self) -> bool {
        self.tsch.is_synchronized()
    }

    /// Synchronised and attached to the DODAG.
    pub fn is_joined(&self) -> bool {
        self.is_synchronized() && self.rpl.has_rank()
    }

    pub fn stats(&self) -> MoteStats {
        self.stats
    }

    pub fn rng(&mut self) -> &mut MoteRng {
        &mut self.rng
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    // ── Control plane ─────────────────────────────────────────────────────

    /// EB advertising this mote's join metric; `None` until it has a rank.
    pub fn create_eb(&self) -> Option<Eb> {
        if !self.active || !self.is_joined() {
            return None;
        }
        Some(self.tsch.create_eb(self.rpl.rank().join_metric()))
    }

    /// DIO advertising this mote's rank (infinite without a route).
    pub fn create_dio(&self) -> Dio {
        self.rpl.create_dio()
    }

    /// Returns `true` if this EB synchronised the mote.
    pub fn receive_eb(&mut self, eb: &Eb, now: Asn) -> bool {
        if !self.active {
            return false;
        }
        self.stats.eb_rx += 1;
        let synced = self.tsch.receive_eb(eb, now);
        if synced {
            debug!(mote = %self.id, %now, join_metric = eb.mac.join_metric, "synchronised");
        }
        synced
    }

    pub fn receive_dio(
        &mut self,
        dio:     &Dio,
        channel: Channel,
        now:     Asn,
        link:    &dyn LinkQuality,
    ) -> Option<ParentChange> {
        if !self.active || !self.is_synchronized() {
            return None;
        }
        self.stats.dio_rx += 1;
        self.rpl.receive_dio(dio, channel, now, link)
    }

    pub fn update_etx(
        &mut self,
        channel: Channel,
        mac:     MacAddr,
        acked:   bool,
        link:    &dyn LinkQuality,
    ) -> Option<ParentChange> {
        self.rpl.update_etx(channel, mac, acked, link)
    }

    // ── Data plane ────────────────────────────────────────────────────────

    /// Create one application packet toward a peer chosen uniformly from
    /// `peers`.  `None` if there is nobody to send to.
    pub fn generate_packet(&mut self, now: Asn, peers: &[MoteId]) -> Option<PacketEvent> {
        if !self.active {
            return None;
        }
        let dst = *self.rng.choose(peers)?;
        let body = DataBody { src: self.id, dst, seq: self.next_seq, created_at: now, hops: 0 };
        self.next_seq = self.next_seq.wrapping_add(1);
        self.stats.generated += 1;

        let fate = if self.rpl.preferred_parent().is_none() {
            PacketFate::Dropped(DropReason::NoRoute)
        } else {
            self.enqueue(body)
        };
        if matches!(fate, PacketFate::Dropped(_)) {
            self.stats.dropped += 1;
        }
        Some(PacketEvent { mote: self.id, asn: now, body, fate })
    }

    /// Head-of-line frame addressed to the current preferred parent.
    pub fn next_frame(&self) -> Option<Data> {
        let head = self.queue.front()?;
        let parent = self.rpl.preferred_parent()?;
        Some(Data::new(head.body).addressed(self.mac, parent.mac))
    }

    /// Account for one transmission of the head-of-line frame.
    ///
    /// Acked frames leave the queue.  A frame that exhausted its retries is
    /// dropped and reported.
    pub fn on_tx_result(&mut self, acked: bool, now: Asn) -> Option<PacketEvent> {
        let head = self.queue.front_mut()?;
        self.stats.tx_attempts += 1;
        if acked {
            self.stats.tx_acked += 1;
            self.queue.pop_front();
            return None;
        }
        head.attempts = head.attempts.saturating_add(1);
        if head.attempts > self.config.max_tx_retries {
            return self.drop_head(DropReason::MaxRetries, now);
        }
        None
    }

    /// Discard the head-of-line frame.
    pub fn drop_head(&mut self, reason: DropReason, now: Asn) -> Option<PacketEvent> {
        let head = self.queue.pop_front()?;
        self.stats.dropped += 1;
        Some(PacketEvent { mote: self.id, asn: now, body: head.body, fate: PacketFate::Dropped(reason) })
    }

    /// Accept a DATA frame from a child.  Returns an event if the packet
    /// ends here (delivered or dropped); `None` if it was queued onward.
    pub fn receive_data(&mut self, data: &Data, now: Asn) -> Option<PacketEvent> {
        if !self.active || !self.is_synchronized() {
            return None;
        }
        let mut body = data.app;
        body.hops = body.hops.saturating_add(1);

        let fate = if body.dst == self.id || self.is_root() {
            self.stats.delivered += 1;
            PacketFate::Delivered
        } else if body.hops >= MAX_HOPS {
            self.stats.dropped += 1;
            PacketFate::Dropped(DropReason::HopLimit)
        } else {
            match self.enqueue(body) {
                PacketFate::Generated => {
                    self.stats.forwarded += 1;
                    return None;
                }
                fate => {
                    self.stats.dropped += 1;
                    fate
                }
            }
        };
        Some(PacketEvent { mote: self.id, asn: now, body, fate })
    }

    fn enqueue(&mut self, body: DataBody) -> PacketFate {
        if self.queue.len() >= self.config.tx_queue_size {
            return PacketFate::Dropped(DropReason::QueueFull);
        }
        self.queue.push_back(Queued { body, attempts: 0 });
        PacketFate::Generated
    }

    /// Back to the power-on state (identity and RNG stream are kept).
    pub fn reset(&mut self) {
        self.tsch.reset();
        self.rpl.reset();
        self.queue.clear();
        self.active = true;
        self.next_seq = 0;
        self.stats = MoteStats::default();
    }
}
