//! What a scheduled event asks its target mote to do.

use serde::Serialize;

/// Payload of every event in a run's scheduler.
///
/// Actions carry no references into run state: the target mote is resolved
/// when the event fires, so an event for a mote that has since gone away or
/// been deactivated simply does nothing.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Power the mote on and start its timers.
    Boot,
    /// Broadcast an Enhanced Beacon in the next shared cell.
    SendEb,
    /// Broadcast a DIO in the next shared cell.
    SendDio,
    /// Application timer: create one DATA packet.
    GeneratePacket,
    /// Try to send the head of the TX queue to the preferred parent.
    TxData,
}

impl Action {
    pub fn name(self) -> &'static str {
        match self {
            Action::Boot => "boot",
            Action::SendEb => "send_eb",
            Action::SendDio => "send_dio",
            Action::GeneratePacket => "generate_packet",
            Action::TxData => "tx_data",
        }
    }
}
