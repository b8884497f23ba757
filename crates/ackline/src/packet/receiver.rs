use super::header::{ACK_BITS, Packet, PacketHeader};
use crate::error::Result;
use crate::sequence::SequenceBuffer;
use crate::transport::Transport;

/// Pulls datagrams off the transport and remembers which sequences arrived so
/// outgoing headers can acknowledge them.
#[derive(Debug)]
pub struct PacketReceiver {
    received: SequenceBuffer<()>,
}

impl Default for PacketReceiver {
    fn default() -> Self {
        Self {
            received: SequenceBuffer::default(),
        }
    }
}

impl PacketReceiver {
    pub fn new(capacity: usize) -> Self {
        Self {
            received: SequenceBuffer::new(capacity),
        }
    }

    /// Returns `Ok(None)` when nothing is waiting. A datagram that fails to
    /// frame is consumed and reported, and its sequence is not recorded.
    pub fn receive_next<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
    ) -> Result<Option<Packet>> {
        let Some(datagram) = transport.receive()? else {
            return Ok(None);
        };

        let packet = Packet::decode(datagram)?;
        self.received.insert(packet.header.sequence, ());
        log::trace!(
            "received packet {} ({} payload bytes)",
            packet.header.sequence,
            packet.payload.len()
        );

        Ok(Some(packet))
    }

    /// Ack fields for the next outgoing packet. The sequence is left at zero
    /// for the packet sender to fill in.
    pub fn build_next_header(&self) -> PacketHeader {
        let last_ack = self.received.most_recent_sequence();
        let mut ack_bits = 0u32;

        for i in 0..ACK_BITS {
            if self.received.contains(last_ack.wrapping_sub(i + 1)) {
                ack_bits |= 1 << i;
            }
        }

        PacketHeader::new(0, last_ack, ack_bits)
    }
}
