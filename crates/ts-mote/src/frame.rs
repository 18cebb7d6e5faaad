//! Typed frames exchanged at the simulated link layer.
//!
//! Each frame kind is a closed record; there is no free-form payload.  The
//! JSON wire form matches the frame dumps researchers read:
//!
//! ```text
//! EB   {"type":"EB",  "mac":{"srcMac":…,"dstMac":…,"join_metric":0}}
//! DIO  {"type":"DIO", "mac":{"srcMac":…,"dstMac":…}, "app":{"rank":256}}
//! DATA {"type":"DATA","mac":{"srcMac":…,"dstMac":…}, "app":{"src":3,"dst":0,…}}
//! ```
//!
//! Constructors leave addressing empty; the sender attaches it with
//! `addressed` right before handing the frame to the radio.  A frame
//! without both addresses fails [`Packet::validate`].

use serde::{Deserialize, Serialize};
use ts_core::{Asn, MacAddr, MoteId};

use crate::rpl::Rank;
use crate::{FrameError, FrameResult};

/// Link-layer addressing shared by DIO and DATA frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacHeader {
    #[serde(rename = "srcMac", default, skip_serializing_if = "Option::is_none")]
    pub src_mac: Option<MacAddr>,
    #[serde(rename = "dstMac", default, skip_serializing_if = "Option::is_none")]
    pub dst_mac: Option<MacAddr>,
}

impl MacHeader {
    pub fn new(src: MacAddr, dst: MacAddr) -> Self {
        Self { src_mac: Some(src), dst_mac: Some(dst) }
    }
}

// ── EB ────────────────────────────────────────────────────────────────────────

/// Enhanced Beacon MAC fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EbHeader {
    #[serde(rename = "srcMac", default, skip_serializing_if = "Option::is_none")]
    pub src_mac:     Option<MacAddr>,
    #[serde(rename = "dstMac", default, skip_serializing_if = "Option::is_none")]
    pub dst_mac:     Option<MacAddr>,
    pub join_metric: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eb {
    pub mac: EbHeader,
}

impl Eb {
    pub fn new(join_metric: u16) -> Self {
        Self { mac: EbHeader { src_mac: None, dst_mac: None, join_metric } }
    }

    pub fn addressed(mut self, src: MacAddr, dst: MacAddr) -> Self {
        self.mac.src_mac = Some(src);
        self.mac.dst_mac = Some(dst);
        self
    }
}

// ── DIO ───────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DioBody {
    pub rank: Rank,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dio {
    pub mac: MacHeader,
    pub app: DioBody,
}

impl Dio {
    pub fn new(rank: Rank) -> Self {
        Self { mac: MacHeader::default(), app: DioBody { rank } }
    }

    pub fn addressed(mut self, src: MacAddr, dst: MacAddr) -> Self {
        self.mac = MacHeader::new(src, dst);
        self
    }
}

// ── DATA ──────────────────────────────────────────────────────────────────────

/// End-to-end application payload.  Survives every hop unchanged except for
/// the hop counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataBody {
    pub src:        MoteId,
    pub dst:        MoteId,
    pub seq:        u32,
    pub created_at: Asn,
    pub hops:       u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Data {
    pub mac: MacHeader,
    pub app: DataBody,
}

impl Data {
    pub fn new(app: DataBody) -> Self {
        Self { mac: MacHeader::default(), app }
    }

    pub fn addressed(mut self, src: MacAddr, dst: MacAddr) -> Self {
        self.mac = MacHeader::new(src, dst);
        self
    }
}

// ── Packet ────────────────────────────────────────────────────────────────────

/// Any frame that can be put on the air.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Packet {
    #[serde(rename = "EB")]
    Eb(Eb),
    #[serde(rename = "DIO")]
    Dio(Dio),
    #[serde(rename = "DATA")]
    Data(Data),
}

impl Packet {
    pub fn kind(&self) -> &'static str {
        match self {
            Packet::Eb(_) => "EB",
            Packet::Dio(_) => "DIO",
            Packet::Data(_) => "DATA",
        }
    }

    pub fn src_mac(&self) -> Option<MacAddr> {
        match self {
            Packet::Eb(eb) => eb.mac.src_mac,
            Packet::Dio(dio) => dio.mac.src_mac,
            Packet::Data(data) => data.mac.src_mac,
        }
    }

    pub fn dst_mac(&self) -> Option<MacAddr> {
        match self {
            Packet::Eb(eb) => eb.mac.dst_mac,
            Packet::Dio(dio) => dio.mac.dst_mac,
            Packet::Data(data) => data.mac.dst_mac,
        }
    }

    /// Require both link-layer addresses.
    pub fn validate(&self) -> FrameResult<()> {
        if self.src_mac().is_none() {
            return Err(FrameError::MissingAddress { kind: self.kind(), field: "srcMac" });
        }
        if self.dst_mac().is_none() {
            return Err(FrameError::MissingAddress { kind: self.kind(), field: "dstMac" });
        }
        Ok(())
    }
}

impl From<Eb> for Packet {
    fn from(eb: Eb) -> Packet {
        Packet::Eb(eb)
    }
}

impl From<Dio> for Packet {
    fn from(dio: Dio) -> Packet {
        Packet::Dio(dio)
    }
}

impl From<Data> for Packet {
    fn from(data: Data) -> Packet {
        Packet::Data(data)
    }
}

/// Serialise a frame to its JSON wire form.
pub fn encode(packet: &Packet) -> FrameResult<String> {
    Ok(serde_json::to_string(packet)?)
}

/// Parse and validate a JSON wire frame.
pub fn decode(wire: &str) -> FrameResult<Packet> {
    let packet: Packet = serde_json::from_str(wire)?;
    packet.validate()?;
    Ok(packet)
}
