//! Virtual time model.
//!
//! # Design
//!
//! Time is an absolute slot number (`Asn`), the counter every TSCH mote
//! shares once synchronised.  The mapping to seconds is held in `SlotClock`:
//!
//!   secs = asn * slot_duration_secs
//!
//! Using an integer slot counter as the canonical time unit means ordering is
//! exact (no floating-point drift) and equal timestamps really are equal,
//! which the event scheduler relies on for its tie-break.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Asn ──────────────────────────────────────────────────────────────────────

/// Absolute slot number.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Asn(pub u64);

impl Asn {
    pub const ZERO: Asn = Asn(0);

    /// Return the slot `n` slots after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Asn {
        Asn(self.0.saturating_add(n))
    }

    /// Slots elapsed from `earlier` to `self` (zero if `earlier` is later).
    #[inline]
    pub fn since(self, earlier: Asn) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Asn {
    type Output = Asn;
    #[inline]
    fn add(self, rhs: u64) -> Asn {
        self.offset(rhs)
    }
}

impl fmt::Display for Asn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asn{}", self.0)
    }
}

// ── SlotClock ─────────────────────────────────────────────────────────────────

/// Converts between slot counts and seconds, and locates slotframe cells.
///
/// `SlotClock` holds no current time; the event scheduler owns "now".
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotClock {
    /// Seconds per timeslot (10 ms in IEEE 802.15.4e defaults).
    pub slot_duration_secs: f64,
    /// Slots per slotframe.
    pub slotframe_length: u64,
}

impl SlotClock {
    pub fn new(slot_duration_secs: f64, slotframe_length: u64) -> Self {
        Self { slot_duration_secs, slotframe_length: slotframe_length.max(1) }
    }

    #[inline]
    pub fn to_secs(&self, asn: Asn) -> f64 {
        asn.0 as f64 * self.slot_duration_secs
    }

    /// How many slots span `secs` seconds? (rounds up, never zero)
    #[inline]
    pub fn slots_for_secs(&self, secs: f64) -> u64 {
        if self.slot_duration_secs <= 0.0 || !secs.is_finite() || secs <= 0.0 {
            return 1;
        }
        ((secs / self.slot_duration_secs).ceil() as u64).max(1)
    }

    /// Position of `asn` within its slotframe.
    #[inline]
    pub fn slot_offset(&self, asn: Asn) -> u64 {
        asn.0 % self.slotframe_length
    }

    /// First shared cell (slot offset 0) strictly after `after`.
    pub fn next_shared_cell(&self, after: Asn) -> Asn {
        let next_frame = after.0 / self.slotframe_length + 1;
        Asn(next_frame * self.slotframe_length)
    }

    /// First shared cell at or after `at`.
    pub fn shared_cell_at_or_after(&self, at: Asn) -> Asn {
        if self.slot_offset(at) == 0 {
            at
        } else {
            self.next_shared_cell(at)
        }
    }
}
