use super::header::{Packet, PacketHeader};
use crate::error::Result;
use crate::transport::Transport;

/// Stamps outgoing packets with a wrapping sequence number and writes them to
/// the transport, one write per packet.
#[derive(Debug, Default)]
pub struct PacketSender {
    next_sequence: u16,
}

impl PacketSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_sequence(&self) -> u16 {
        self.next_sequence
    }

    /// Returns the sequence assigned to the packet. The counter only advances
    /// once the transport accepted the datagram.
    pub fn send<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        mut header: PacketHeader,
        payload: &[u8],
    ) -> Result<u16> {
        header.sequence = self.next_sequence;
        let datagram = Packet::encode(&header, payload);

        let written = transport.send(&datagram)?;
        if written < datagram.len() {
            log::warn!(
                "short write for packet {}: {written} of {} bytes",
                header.sequence,
                datagram.len()
            );
        }

        self.next_sequence = self.next_sequence.wrapping_add(1);
        log::debug!(
            "sent packet {} ({} bytes, ack {})",
            header.sequence,
            datagram.len(),
            header.last_ack
        );

        Ok(header.sequence)
    }
}
