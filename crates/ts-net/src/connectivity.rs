//! Per-link packet delivery ratios.
//!
//! # Data layout
//!
//! Links are directed and per channel:
//!
//! ```text
//! (src, dst, channel) → PDR ∈ [0, 1]
//! ```
//!
//! Only explicitly set links are stored; every other pair of distinct motes
//! resolves to the matrix's baseline PDR.  A mote never hears itself, so
//! `(m, m, _)` is always 0.

use std::collections::HashMap;

use tracing::trace;
use ts_core::{Channel, MoteId, SimRng};

use crate::{NetError, NetResult};

/// Read access to link quality, as consulted by objective functions.
pub trait LinkQuality {
    /// PDR of the directed link `src → dst` on `channel`, in [0, 1].
    fn link_pdr(&self, src: MoteId, dst: MoteId, channel: Channel) -> f64;
}

/// Stochastic delivery table for one run.
#[derive(Clone, Debug)]
pub struct ConnectivityMatrix {
    num_motes:    u32,
    num_channels: u8,
    baseline:     f64,
    links:        HashMap<(MoteId, MoteId, Channel), f64>,
}

impl ConnectivityMatrix {
    /// Matrix for `num_motes` motes over `num_channels` channels where every
    /// unset link has PDR `baseline`.
    pub fn new(num_motes: u32, num_channels: u8, baseline: f64) -> NetResult<Self> {
        check_pdr(baseline)?;
        Ok(Self {
            num_motes,
            num_channels,
            baseline,
            links: HashMap::new(),
        })
    }

    /// Fully connected matrix (baseline PDR 1.0), the usual starting point for
    /// hand-built test topologies.
    pub fn fully_connected(num_motes: u32, num_channels: u8) -> Self {
        Self {
            num_motes,
            num_channels,
            baseline: 1.0,
            links: HashMap::new(),
        }
    }

    pub fn num_motes(&self) -> u32 {
        self.num_motes
    }

    pub fn num_channels(&self) -> u8 {
        self.num_channels
    }

    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    /// PDR of `src → dst` on `channel`.
    pub fn get_pdr(&self, src: MoteId, dst: MoteId, channel: Channel) -> f64 {
        if src == dst {
            return 0.0;
        }
        self.links
            .get(&(src, dst, channel))
            .copied()
            .unwrap_or(self.baseline)
    }

    /// Set the directed link `src → dst` on `channel`.
    pub fn set_pdr(&mut self, src: MoteId, dst: MoteId, channel: Channel, value: f64) -> NetResult<()> {
        self.check_link(src, dst, channel)?;
        check_pdr(value)?;
        self.links.insert((src, dst, channel), value);
        Ok(())
    }

    /// Set `a → b` and `b → a` on `channel` to the same value.
    pub fn set_pdr_both_directions(
        &mut self,
        a:       MoteId,
        b:       MoteId,
        channel: Channel,
        value:   f64,
    ) -> NetResult<()> {
        self.check_link(a, b, channel)?;
        check_pdr(value)?;
        self.links.insert((a, b, channel), value);
        self.links.insert((b, a, channel), value);
        Ok(())
    }

    /// Set both directions between `a` and `b` on every channel.
    pub fn set_link(&mut self, a: MoteId, b: MoteId, value: f64) -> NetResult<()> {
        for ch in 0..self.num_channels {
            self.set_pdr_both_directions(a, b, Channel(ch), value)?;
        }
        Ok(())
    }

    /// One Bernoulli trial on `src → dst`: does a frame sent now arrive?
    pub fn transmit(&self, rng: &mut SimRng, src: MoteId, dst: MoteId, channel: Channel) -> bool {
        let pdr = self.get_pdr(src, dst, channel);
        let delivered = rng.gen_bool(pdr);
        trace!(%src, %dst, %channel, pdr, delivered, "link draw");
        delivered
    }

    /// Drop every explicitly set link; all links fall back to the baseline.
    pub fn reset(&mut self) {
        self.links.clear();
    }

    fn check_link(&self, src: MoteId, dst: MoteId, channel: Channel) -> NetResult<()> {
        if src == dst {
            return Err(NetError::SelfLink(src));
        }
        for id in [src, dst] {
            if id.0 >= self.num_motes {
                return Err(NetError::UnknownMote(id));
            }
        }
        if channel.0 >= self.num_channels {
            return Err(NetError::UnknownChannel(channel));
        }
        Ok(())
    }
}

impl LinkQuality for ConnectivityMatrix {
    fn link_pdr(&self, src: MoteId, dst: MoteId, channel: Channel) -> f64 {
        self.get_pdr(src, dst, channel)
    }
}

fn check_pdr(value: f64) -> NetResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(NetError::InvalidPdr(value))
    }
}
