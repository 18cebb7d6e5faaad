//! Objective functions: how link quality turns into rank.
//!
//! Parent-selection rules (loop avoidance, hysteresis) are shared and live
//! in [`Rpl`](super::Rpl).  An objective function only answers two
//! questions: how good is the link to this neighbor, and how much rank does
//! a link of that quality cost.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use ts_core::MoteId;
use ts_net::LinkQuality;

use super::{MIN_HOP_RANK_INCREASE, Neighbor};
use crate::MoteError;

/// Links below this PDR are never used as a route to the root.
pub const ACCEPTABLE_LOWEST_PDR: f64 = 0.83;

/// Pluggable link metric.
pub trait ObjectiveFunction: Send {
    fn kind(&self) -> OfKind;

    /// PDR-equivalent quality in [0, 1] of the link from `own` to `neighbor`.
    fn link_quality(&self, own: MoteId, neighbor: &Neighbor, link: &dyn LinkQuality) -> f64;

    /// Rank added on top of a parent's rank for a link of quality `pdr`.
    fn rank_increase(&self, pdr: f64) -> u16;
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize)]
pub enum OfKind {
    #[serde(rename = "OFBestLinkPDR")]
    BestLinkPdr,
    #[serde(rename = "OF0")]
    Of0,
}

impl OfKind {
    pub fn name(self) -> &'static str {
        match self {
            OfKind::BestLinkPdr => "OFBestLinkPDR",
            OfKind::Of0 => "OF0",
        }
    }

    pub fn build(self) -> Box<dyn ObjectiveFunction> {
        match self {
            OfKind::BestLinkPdr => Box::new(OfBestLinkPdr),
            OfKind::Of0 => Box::new(Of0),
        }
    }
}

impl FromStr for OfKind {
    type Err = MoteError;

    fn from_str(s: &str) -> Result<Self, MoteError> {
        match s {
            "OFBestLinkPDR" => Ok(OfKind::BestLinkPdr),
            "OF0" => Ok(OfKind::Of0),
            other => Err(MoteError::UnknownObjectiveFunction(other.to_owned())),
        }
    }
}

impl fmt::Display for OfKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn clamp_rank(value: f64) -> u16 {
    if value.is_nan() || value >= f64::from(u16::MAX) {
        u16::MAX
    } else {
        value.round().max(f64::from(MIN_HOP_RANK_INCREASE)) as u16
    }
}

// ── OFBestLinkPDR ─────────────────────────────────────────────────────────────

/// Reads link PDR straight from the radio model and charges weak links
/// steeply: a perfect link costs one hop, a link exactly at
/// [`ACCEPTABLE_LOWEST_PDR`] costs three.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfBestLinkPdr;

impl OfBestLinkPdr {
    /// Extra hops charged for a link at the acceptable floor.
    const FLOOR_PENALTY_HOPS: f64 = 2.0;
}

impl ObjectiveFunction for OfBestLinkPdr {
    fn kind(&self) -> OfKind {
        OfKind::BestLinkPdr
    }

    fn link_quality(&self, own: MoteId, neighbor: &Neighbor, link: &dyn LinkQuality) -> f64 {
        link.link_pdr(own, neighbor.mote, neighbor.channel)
    }

    fn rank_increase(&self, pdr: f64) -> u16 {
        if pdr <= 0.0 {
            return u16::MAX;
        }
        let deficit = (1.0 - pdr.min(1.0)) / (1.0 - ACCEPTABLE_LOWEST_PDR);
        clamp_rank(f64::from(MIN_HOP_RANK_INCREASE) * (1.0 + Self::FLOOR_PENALTY_HOPS * deficit))
    }
}

// ── OF0 ───────────────────────────────────────────────────────────────────────

/// Learns link quality from its own ACK history and uses the RFC 6552
/// style step `(3·ETX − 2) · MIN_HOP_RANK_INCREASE`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Of0;

impl ObjectiveFunction for Of0 {
    fn kind(&self) -> OfKind {
        OfKind::Of0
    }

    fn link_quality(&self, _own: MoteId, neighbor: &Neighbor, _link: &dyn LinkQuality) -> f64 {
        neighbor.ack_ratio()
    }

    fn rank_increase(&self, pdr: f64) -> u16 {
        if pdr <= 0.0 {
            return u16::MAX;
        }
        let etx = 1.0 / pdr.min(1.0);
        clamp_rank((3.0 * etx - 2.0) * f64::from(MIN_HOP_RANK_INCREASE))
    }
}
