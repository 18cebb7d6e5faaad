//! Strongly typed identifier wrappers.
//!
//! `MoteId` indexes the per-run mote vector directly.  `MacAddr` is the
//! link-layer address carried in frames; every mote's MAC address is derived
//! from its id so the two convert losslessly in both directions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a mote in the run's mote vector.  Mote 0 is the DAG root.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoteId(pub u32);

impl MoteId {
    /// The DAG root of every run.
    pub const ROOT: MoteId = MoteId(0);

    /// Cast to `usize` for direct use as a `Vec` index.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }

    /// The MAC address assigned to this mote.
    #[inline]
    pub fn mac(self) -> MacAddr {
        MacAddr(MacAddr::MOTE_PREFIX | u64::from(self.0))
    }
}

impl fmt::Display for MoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mote{}", self.0)
    }
}

impl TryFrom<usize> for MoteId {
    type Error = std::num::TryFromIntError;
    fn try_from(n: usize) -> Result<MoteId, Self::Error> {
        u32::try_from(n).map(MoteId)
    }
}

// ── MacAddr ───────────────────────────────────────────────────────────────────

/// 64-bit extended MAC address.
///
/// Serialised as colon-separated hex (`"00:12:4b:00:00:00:00:03"`), the
/// notation used in frame dumps.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddr(pub u64);

impl MacAddr {
    /// Link-layer broadcast destination.
    pub const BROADCAST: MacAddr = MacAddr(u64::MAX);

    /// OUI-style prefix shared by every simulated mote.
    const MOTE_PREFIX: u64 = 0x0012_4b00_0000_0000;

    pub fn is_broadcast(self) -> bool {
        self == Self::BROADCAST
    }

    /// The mote owning this address, if it is a simulated mote's address.
    pub fn mote_id(self) -> Option<MoteId> {
        if self.is_broadcast() || self.0 & 0xffff_ffff_0000_0000 != Self::MOTE_PREFIX {
            return None;
        }
        Some(MoteId((self.0 & 0xffff_ffff) as u32))
    }
}

impl From<MoteId> for MacAddr {
    fn from(id: MoteId) -> MacAddr {
        id.mac()
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0.to_be_bytes();
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]
        )
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddr({self})")
    }
}

impl std::str::FromStr for MacAddr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut value: u64 = 0;
        let mut octets = 0;
        for part in s.split(':') {
            let byte = u8::from_str_radix(part, 16).map_err(|_| format!("bad MAC octet `{part}`"))?;
            value = (value << 8) | u64::from(byte);
            octets += 1;
        }
        if octets != 8 {
            return Err(format!("MAC address `{s}` must have 8 octets"));
        }
        Ok(MacAddr(value))
    }
}

impl Serialize for MacAddr {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddr {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ── Channel ───────────────────────────────────────────────────────────────────

/// Physical radio channel index (0-based, `< num_channels`).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Channel(pub u8);

impl Channel {
    /// Channel used in `asn` by a cell with `channel_offset` when hopping over
    /// `num_channels` channels.
    #[inline]
    pub fn hop(asn: u64, channel_offset: u8, num_channels: u8) -> Channel {
        let n = u64::from(num_channels.max(1));
        Channel(((asn + u64::from(channel_offset)) % n) as u8)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch{}", self.0)
    }
}
