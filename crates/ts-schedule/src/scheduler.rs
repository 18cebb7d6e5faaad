//! `EventScheduler` — ordered queue of pending state transitions.
//!
//! Every state change in a run happens inside an event's action, and every
//! event passes through here.  The scheduler owns the virtual clock: `now`
//! moves only when an event is popped, and only forward.
//!
//! # Performance note
//!
//! `BTreeMap` gives O(log E) insert, pop-first and cancel, where E is the
//! number of pending events.  A run keeps roughly three periodic timers per
//! mote plus in-flight transmissions pending, so E stays small.

use std::collections::BTreeMap;
use std::ops::ControlFlow;

use tracing::trace;
use ts_core::{Asn, MoteId};

use crate::{ScheduleError, ScheduleResult};

/// Total-order key of a pending event.
///
/// Derived `Ord` compares `asn` first, then `seq`, which is exactly the
/// dispatch order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct EventKey {
    pub asn: Asn,
    pub seq: u64,
}

/// A dispatched event: when, in which order, for whom, and what to do.
#[derive(Clone, Debug, PartialEq)]
pub struct Event<A> {
    pub key:    EventKey,
    pub target: MoteId,
    pub action: A,
}

impl<A> Event<A> {
    #[inline]
    pub fn asn(&self) -> Asn {
        self.key.asn
    }
}

/// A priority queue of future events plus the virtual clock.
pub struct EventScheduler<A> {
    pending:    BTreeMap<EventKey, (MoteId, A)>,
    now:        Asn,
    next_seq:   u64,
    dispatched: u64,
}

impl<A> Default for EventScheduler<A> {
    fn default() -> Self {
        Self {
            pending:    BTreeMap::new(),
            now:        Asn::ZERO,
            next_seq:   0,
            dispatched: 0,
        }
    }
}

impl<A> EventScheduler<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[inline]
    pub fn now(&self) -> Asn {
        self.now
    }

    /// Queue `action` for `target` at `asn`.
    ///
    /// Scheduling at the current slot is allowed (the event runs after every
    /// event already queued for that slot).  Scheduling in the past is an
    /// [`ScheduleError::InvalidTime`].
    pub fn schedule(&mut self, asn: Asn, target: MoteId, action: A) -> ScheduleResult<EventKey> {
        if asn < self.now {
            return Err(ScheduleError::InvalidTime { requested: asn, now: self.now });
        }
        let key = EventKey { asn, seq: self.next_seq };
        self.next_seq += 1;
        self.pending.insert(key, (target, action));
        Ok(key)
    }

    /// Remove a pending event.  Returns `false` if it already fired or was
    /// never scheduled.
    pub fn cancel(&mut self, key: EventKey) -> bool {
        self.pending.remove(&key).is_some()
    }

    /// Time of the earliest pending event.
    pub fn peek_time(&self) -> Option<Asn> {
        self.pending.keys().next().map(|k| k.asn)
    }

    /// Pop the earliest event and advance the clock to its time.
    pub fn pop_next(&mut self) -> Option<Event<A>> {
        let (key, (target, action)) = self.pending.pop_first()?;
        self.now = key.asn;
        self.dispatched += 1;
        trace!(asn = key.asn.0, seq = key.seq, %target, "dispatch");
        Some(Event { key, target, action })
    }

    /// Pop the earliest event if it is due at or before `end`.
    ///
    /// Events after `end` stay queued and the clock does not move.
    pub fn pop_next_until(&mut self, end: Asn) -> Option<Event<A>> {
        match self.peek_time() {
            Some(asn) if asn <= end => self.pop_next(),
            _ => None,
        }
    }

    /// Dispatch events until the queue is empty or `handler` breaks.
    ///
    /// The handler receives the scheduler so it can queue follow-up events.
    /// Returns the number of events dispatched by this call.
    pub fn run<F>(&mut self, handler: F) -> ScheduleResult<u64>
    where
        F: FnMut(&mut Self, Event<A>) -> ScheduleResult<ControlFlow<()>>,
    {
        self.run_until(Asn(u64::MAX), handler)
    }

    /// Like [`run`](Self::run) but leaves events later than `end` queued.
    pub fn run_until<F>(&mut self, end: Asn, mut handler: F) -> ScheduleResult<u64>
    where
        F: FnMut(&mut Self, Event<A>) -> ScheduleResult<ControlFlow<()>>,
    {
        let mut count = 0;
        while let Some(event) = self.pop_next_until(end) {
            count += 1;
            if handler(self, event)?.is_break() {
                break;
            }
        }
        Ok(count)
    }

    /// Clear all pending events and rewind the clock.
    ///
    /// Idempotent; the scheduler is immediately reusable for a fresh run.
    pub fn destroy(&mut self) {
        self.pending.clear();
        self.now = Asn::ZERO;
        self.next_seq = 0;
        self.dispatched = 0;
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Events popped since construction or the last [`destroy`](Self::destroy).
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }
}
