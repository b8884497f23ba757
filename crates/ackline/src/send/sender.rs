use std::any::{TypeId, type_name};
use std::collections::HashMap;

use super::packer::{MAX_PAYLOAD_SIZE, PayloadPacker};
use super::reliable::{RETRANSMIT_DELAY, ReliableMessageSender};
use super::unreliable::UnreliableMessageSender;
use crate::error::{Error, Result};
use crate::message::{Message, OutgoingMessage, Reliability};
use crate::packet::{PacketHeader, PacketSender};
use crate::sequence::DEFAULT_BUFFER_CAPACITY;
use crate::transport::Transport;

/// Outgoing half of an endpoint: resolves message types, queues them on the
/// matching sender and drains both queues into packets.
#[derive(Debug)]
pub struct MessageSender {
    reliable: ReliableMessageSender,
    unreliable: UnreliableMessageSender,
    packets: PacketSender,
    type_ids: HashMap<TypeId, u16>,
    max_payload_size: usize,
}

impl Default for MessageSender {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY, MAX_PAYLOAD_SIZE, RETRANSMIT_DELAY)
    }
}

impl MessageSender {
    pub fn new(buffer_capacity: usize, max_payload_size: usize, retransmit_delay: i64) -> Self {
        Self {
            reliable: ReliableMessageSender::new(buffer_capacity, retransmit_delay),
            unreliable: UnreliableMessageSender::new(),
            packets: PacketSender::new(),
            type_ids: HashMap::new(),
            max_payload_size,
        }
    }

    pub fn register<M: Message>(&mut self, type_id: u16) -> Result<()> {
        if self.type_ids.values().any(|&id| id == type_id)
            || self.type_ids.contains_key(&TypeId::of::<M>())
        {
            return Err(Error::DuplicateRegistration(type_id));
        }

        self.type_ids.insert(TypeId::of::<M>(), type_id);
        Ok(())
    }

    pub fn type_id_of<M: Message>(&self) -> Option<u16> {
        self.type_ids.get(&TypeId::of::<M>()).copied()
    }

    /// Returns the uid assigned within the message's reliability class. A
    /// reliable message is refused with [`Error::BacklogFull`] while the
    /// backlog has no free slot.
    pub fn queue<M: Message>(&mut self, message: &M, reliability: Reliability) -> Result<u16> {
        let type_id = self
            .type_id_of::<M>()
            .ok_or(Error::TypeNotRegistered(type_name::<M>()))?;
        let outgoing = OutgoingMessage::encode(type_id, reliability, message);

        Ok(match reliability {
            Reliability::Reliable => self.reliable.queue(outgoing)?,
            Reliability::Unreliable => self.unreliable.queue(outgoing),
        })
    }

    /// Writes packets until neither queue has anything due. Returns how many
    /// packets went out.
    pub fn send_queued<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        now: i64,
        header: PacketHeader,
    ) -> Result<usize> {
        let mut sent = 0;

        loop {
            let mut packer = PayloadPacker::new(self.max_payload_size);
            let uids = self.reliable.add_to_payload(&mut packer, now);
            self.unreliable.add_to_payload(&mut packer, now);

            if packer.is_empty() {
                break;
            }

            let sequence = self.packets.send(transport, header, &packer.into_bytes())?;
            if !uids.is_empty() {
                log::debug!("packet {sequence} carries reliable messages {uids:?}");
            }
            self.reliable.on_packet_sent(sequence, uids);
            sent += 1;
        }

        Ok(sent)
    }

    pub fn ack(&mut self, packet_sequences: &[u16]) {
        self.reliable.ack(packet_sequences);
    }

    pub fn reliable(&self) -> &ReliableMessageSender {
        &self.reliable
    }

    pub fn unreliable(&self) -> &UnreliableMessageSender {
        &self.unreliable
    }

    pub fn next_sequence(&self) -> u16 {
        self.packets.next_sequence()
    }
}
