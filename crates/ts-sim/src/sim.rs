//! The `Sim` run context and its event loop.

use tracing::{debug, info, trace};
use ts_core::{Asn, Channel, MacAddr, MoteId, Settings, SimRng, SlotClock};
use ts_mote::{Action, Dio, DropReason, Mote, PacketFate, ParentChange};
use ts_net::{ConnectivityMatrix, Topology};
use ts_schedule::{Event, EventKey, EventScheduler};

use crate::{MoteSummary, RunSummary, SimError, SimObserver, SimResult};

/// Relative jitter applied to EB and DIO periods.
const CONTROL_JITTER: f64 = 0.1;

/// Everything one run owns.
///
/// Motes, topology and connectivity are created by
/// [`SimBuilder`][crate::SimBuilder] and only ever touched from the event
/// loop, one event at a time.
pub struct Sim {
    /// Parameters of this run.
    pub settings: Settings,

    /// Slot ↔ seconds conversion and shared-cell lookup.
    pub clock: SlotClock,

    /// Pending events and the virtual clock.
    pub scheduler: EventScheduler<Action>,

    /// Who sends application traffic to whom.
    pub topology: Topology,

    /// Per-link delivery ratios consulted for every frame.
    pub connectivity: ConnectivityMatrix,

    /// Mote stacks, indexed by `MoteId`.
    pub motes: Vec<Mote>,

    /// Run-level RNG for delivery draws.
    pub rng: SimRng,

    /// Pending `TxData` event per mote, so each mote has at most one.
    pub(crate) tx_timers: Vec<Option<EventKey>>,
}

impl Sim {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run until `num_slotframes_per_run × slotframe_length` slots have
    /// elapsed.
    pub fn run<O: SimObserver + ?Sized>(&mut self, observer: &mut O) -> SimResult<RunSummary> {
        let end = Asn(self.settings.run_length_slots());
        self.run_until(end, observer, |_| false)
    }

    /// Dispatch every event due at or before `end`, stopping early as soon
    /// as `stop` returns `true` after an event.
    ///
    /// Events later than `end` stay queued, so a run can be continued.
    pub fn run_until<O, F>(&mut self, end: Asn, observer: &mut O, mut stop: F) -> SimResult<RunSummary>
    where
        O: SimObserver + ?Sized,
        F: FnMut(&Sim) -> bool,
    {
        info!(motes = self.motes.len(), from = self.scheduler.now().0, end = end.0, "run started");
        while let Some(event) = self.scheduler.pop_next_until(end) {
            observer.on_dispatch(event.asn(), event.target, event.action);
            self.dispatch(event, observer)?;
            if stop(self) {
                debug!(asn = self.scheduler.now().0, "stop condition reached");
                break;
            }
        }

        let summary = self.summary();
        info!(
            end = summary.end.0,
            events = summary.events,
            joined = summary.joined,
            generated = summary.generated,
            delivered = summary.delivered,
            "run finished"
        );
        observer.on_run_end(&summary);
        Ok(summary)
    }

    /// Snapshot of every mote's state and the run counters.
    pub fn summary(&self) -> RunSummary {
        let motes = self.motes.iter().map(MoteSummary::from).collect();
        RunSummary::from_motes(self.scheduler.now(), self.scheduler.dispatched(), motes)
    }

    /// Release all per-run state.
    ///
    /// Idempotent.  The scheduler is left empty at ASN 0 and can be reused.
    pub fn teardown(&mut self) {
        self.scheduler.destroy();
        self.motes.clear();
        self.tx_timers.clear();
        self.topology = Topology::empty(self.topology.kind());
        self.connectivity.reset();
        debug!("run state torn down");
    }

    pub fn mote(&self, id: MoteId) -> Option<&Mote> {
        self.motes.get(id.index())
    }

    pub fn preferred_parent(&self, id: MoteId) -> Option<MoteId> {
        self.mote(id)?.rpl.preferred_parent().map(|p| p.mote)
    }

    /// Channel used by the shared cell in `asn`.
    pub fn channel_at(&self, asn: Asn) -> Channel {
        Channel::hop(asn.0, 0, self.settings.num_channels)
    }

    /// Take a mote out of the run.  Its pending events become no-ops.
    pub fn deactivate_mote(&mut self, id: MoteId) -> SimResult<()> {
        let mote = self.motes.get_mut(id.index()).ok_or(SimError::UnknownMote(id))?;
        mote.deactivate();
        if let Some(key) = self.tx_timers.get_mut(id.index()).and_then(Option::take) {
            self.scheduler.cancel(key);
        }
        debug!(mote = %id, "deactivated");
        Ok(())
    }

    // ── Direct injection (bypasses the radio) ─────────────────────────────

    /// Hand `dst` the EB `src` would send, without a delivery draw.
    /// Returns whether it synchronised `dst`.
    pub fn deliver_eb(&mut self, src: MoteId, dst: MoteId) -> SimResult<bool> {
        let sender = self.mote(src).ok_or(SimError::UnknownMote(src))?;
        let eb = sender
            .tsch
            .create_eb(sender.rpl.rank().join_metric())
            .addressed(src.mac(), dst.mac());
        let now = self.scheduler.now();
        let receiver = self.motes.get_mut(dst.index()).ok_or(SimError::UnknownMote(dst))?;
        Ok(receiver.receive_eb(&eb, now))
    }

    /// Hand `dst` the DIO `src` would currently send, without a delivery draw.
    pub fn deliver_dio(&mut self, src: MoteId, dst: MoteId) -> SimResult<Option<ParentChange>> {
        let dio = self
            .mote(src)
            .ok_or(SimError::UnknownMote(src))?
            .create_dio()
            .addressed(src.mac(), dst.mac());
        self.inject_dio(dst, dio)
    }

    /// Hand `dst` an arbitrary DIO, forged or malformed ones included.
    pub fn inject_dio(&mut self, dst: MoteId, dio: Dio) -> SimResult<Option<ParentChange>> {
        let now = self.scheduler.now();
        let channel = self.channel_at(now);
        let receiver = self.motes.get_mut(dst.index()).ok_or(SimError::UnknownMote(dst))?;
        Ok(receiver.receive_dio(&dio, channel, now, &self.connectivity))
    }

    /// Report one unicast outcome from `mote` toward `neighbor`.
    pub fn update_etx(&mut self, mote: MoteId, neighbor: MoteId, acked: bool) -> SimResult<Option<ParentChange>> {
        let channel = self.channel_at(self.scheduler.now());
        let stack = self.motes.get_mut(mote.index()).ok_or(SimError::UnknownMote(mote))?;
        Ok(stack.update_etx(channel, neighbor.mac(), acked, &self.connectivity))
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    fn dispatch<O: SimObserver + ?Sized>(&mut self, event: Event<Action>, observer: &mut O) -> SimResult<()> {
        let id = event.target;
        let now = event.asn();
        match self.motes.get(id.index()) {
            None => {
                debug!(mote = %id, action = event.action.name(), "event for unknown mote ignored");
                return Ok(());
            }
            Some(mote) if !mote.is_active() => {
                trace!(mote = %id, action = event.action.name(), "event for inactive mote ignored");
                return Ok(());
            }
            Some(_) => {}
        }

        match event.action {
            Action::Boot => self.boot(id, now, observer),
            Action::SendEb => self.send_eb(id, now, observer),
            Action::SendDio => self.send_dio(id, now, observer),
            Action::GeneratePacket => self.generate_packet(id, now, observer),
            Action::TxData => self.tx_data(id, now, observer),
        }
    }

    fn boot<O: SimObserver + ?Sized>(&mut self, id: MoteId, now: Asn, observer: &mut O) -> SimResult<()> {
        if self.motes[id.index()].boot(now) {
            observer.on_sync(now, id);
        }
        self.schedule_timer(id, Action::SendEb, now)?;
        self.schedule_timer(id, Action::SendDio, now)?;
        if !id.is_root() && !self.topology.peers(id).is_empty() {
            self.schedule_timer(id, Action::GeneratePacket, now)?;
        }
        Ok(())
    }

    /// Queue the next occurrence of a periodic action.  Control frames go
    /// out in the shared cell, so their timers are rounded up to one.
    fn schedule_timer(&mut self, id: MoteId, action: Action, now: Asn) -> SimResult<EventKey> {
        let (period, spread) = match action {
            Action::SendEb => (self.settings.eb_period_secs, CONTROL_JITTER),
            Action::SendDio => (self.settings.dio_period_secs, CONTROL_JITTER),
            _ => (self.settings.app_pk_period_secs, self.settings.app_pk_period_var),
        };
        let secs = self.motes[id.index()].rng().jitter(period, spread);
        let mut at = now + self.clock.slots_for_secs(secs);
        if matches!(action, Action::SendEb | Action::SendDio) {
            at = self.clock.shared_cell_at_or_after(at);
        }
        Ok(self.scheduler.schedule(at, id, action)?)
    }

    /// Active motes other than `src`, in id order.
    fn receivers(&self, src: MoteId) -> Vec<MoteId> {
        self.motes
            .iter()
            .filter(|m| m.id != src && m.is_active())
            .map(|m| m.id)
            .collect()
    }

    fn send_eb<O: SimObserver + ?Sized>(&mut self, id: MoteId, now: Asn, observer: &mut O) -> SimResult<()> {
        self.schedule_timer(id, Action::SendEb, now)?;
        let Some(eb) = self.motes[id.index()].create_eb() else {
            return Ok(());
        };
        let eb = eb.addressed(id.mac(), MacAddr::BROADCAST);
        let channel = self.channel_at(now);
        for dst in self.receivers(id) {
            if !self.connectivity.transmit(&mut self.rng, id, dst, channel) {
                continue;
            }
            if self.motes[dst.index()].receive_eb(&eb, now) {
                observer.on_sync(now, dst);
            }
        }
        Ok(())
    }

    fn send_dio<O: SimObserver + ?Sized>(&mut self, id: MoteId, now: Asn, observer: &mut O) -> SimResult<()> {
        self.schedule_timer(id, Action::SendDio, now)?;
        let sender = &self.motes[id.index()];
        if !sender.is_synchronized() {
            return Ok(());
        }
        let dio = sender.create_dio().addressed(id.mac(), MacAddr::BROADCAST);
        let channel = self.channel_at(now);
        for dst in self.receivers(id) {
            if !self.connectivity.transmit(&mut self.rng, id, dst, channel) {
                continue;
            }
            let change = self.motes[dst.index()].receive_dio(&dio, channel, now, &self.connectivity);
            if let Some(change) = change {
                self.apply_parent_change(dst, change, now, observer)?;
            }
        }
        Ok(())
    }

    fn generate_packet<O: SimObserver + ?Sized>(&mut self, id: MoteId, now: Asn, observer: &mut O) -> SimResult<()> {
        self.schedule_timer(id, Action::GeneratePacket, now)?;
        let Some(event) = self.motes[id.index()].generate_packet(now, self.topology.peers(id)) else {
            return Ok(());
        };
        observer.on_packet(&event);
        if event.fate == PacketFate::Generated {
            self.ensure_tx(id, now)?;
        }
        Ok(())
    }

    /// One unicast attempt of `id`'s head-of-line frame.
    fn tx_data<O: SimObserver + ?Sized>(&mut self, id: MoteId, now: Asn, observer: &mut O) -> SimResult<()> {
        let i = id.index();
        self.tx_timers[i] = None;

        let frame = self.motes[i].next_frame();
        let Some((frame, parent)) = frame.and_then(|f| Some((f, f.mac.dst_mac?.mote_id()?))) else {
            // Queued frames lose their route when the parent goes away.
            if let Some(event) = self.motes[i].drop_head(DropReason::NoRoute, now) {
                observer.on_packet(&event);
            }
            return self.ensure_tx(id, now);
        };

        let channel = self.channel_at(now);
        let receiver_up = self
            .motes
            .get(parent.index())
            .is_some_and(|m| m.is_active() && m.is_synchronized());
        let delivered = receiver_up && self.connectivity.transmit(&mut self.rng, id, parent, channel);
        let acked = delivered && self.connectivity.transmit(&mut self.rng, parent, id, channel);
        trace!(src = %id, dst = %parent, %channel, delivered, acked, "unicast");

        if delivered {
            match self.motes[parent.index()].receive_data(&frame, now) {
                Some(event) => observer.on_packet(&event),
                None => self.ensure_tx(parent, now)?,
            }
        }

        if let Some(event) = self.motes[i].on_tx_result(acked, now) {
            observer.on_packet(&event);
        }
        let change = self.motes[i].update_etx(channel, parent.mac(), acked, &self.connectivity);
        if let Some(change) = change {
            self.apply_parent_change(id, change, now, observer)?;
        }
        self.ensure_tx(id, now)
    }

    fn apply_parent_change<O: SimObserver + ?Sized>(
        &mut self,
        id:       MoteId,
        change:   ParentChange,
        now:      Asn,
        observer: &mut O,
    ) -> SimResult<()> {
        observer.on_parent_change(now, id, &change);
        if change.new.is_some() {
            self.ensure_tx(id, now)?;
        }
        Ok(())
    }

    /// Make sure a mote with queued frames has a `TxData` pending in the
    /// next shared cell.
    fn ensure_tx(&mut self, id: MoteId, now: Asn) -> SimResult<()> {
        let i = id.index();
        if self.tx_timers[i].is_some() || self.motes[i].queue_len() == 0 {
            return Ok(());
        }
        let at = self.clock.next_shared_cell(now);
        self.tx_timers[i] = Some(self.scheduler.schedule(at, id, Action::TxData)?);
        Ok(())
    }
}
