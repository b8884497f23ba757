use std::collections::HashMap;
use std::fmt;

use bytes::Buf;

use super::DeliveryPolicy;
use crate::error::{Error, Result};
use crate::message::{MessageFactory, MessageHeader, ReceivedMessage};
use crate::packet::{PacketHeader, PacketReceiver};
use crate::sequence::{DEFAULT_BUFFER_CAPACITY, SequenceBuffer};
use crate::transport::Transport;

/// Incoming half of an endpoint. Splits packets into messages, drops
/// duplicates and hands the rest to a [`DeliveryPolicy`].
pub struct MessageReceiver<P> {
    packets: PacketReceiver,
    factories: HashMap<u16, MessageFactory>,
    seen_reliable: SequenceBuffer<()>,
    seen_unreliable: SequenceBuffer<()>,
    policy: P,
}

impl<P: DeliveryPolicy + Default> Default for MessageReceiver<P> {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY, P::default())
    }
}

impl<P: DeliveryPolicy> MessageReceiver<P> {
    pub fn new(buffer_capacity: usize, policy: P) -> Self {
        Self {
            packets: PacketReceiver::new(buffer_capacity),
            factories: HashMap::new(),
            seen_reliable: SequenceBuffer::new(buffer_capacity),
            seen_unreliable: SequenceBuffer::new(buffer_capacity),
            policy,
        }
    }

    pub fn register_factory(&mut self, type_id: u16, factory: MessageFactory) -> Result<()> {
        if self.factories.contains_key(&type_id) {
            return Err(Error::DuplicateRegistration(type_id));
        }
        self.factories.insert(type_id, factory);
        Ok(())
    }

    /// Reads one packet and returns the sequences its header acknowledges.
    ///
    /// `Ok(None)` means nothing was waiting. When a message in the payload
    /// cannot be decoded, the messages before it are still delivered and the
    /// packet still counts as received, but the rest of the payload is skipped
    /// and the error is returned.
    pub fn receive_next_packet<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
    ) -> Result<Option<Vec<u16>>> {
        let Some(packet) = self.packets.receive_next(transport)? else {
            return Ok(None);
        };

        let mut payload = packet.payload;
        while payload.has_remaining() {
            let header = MessageHeader::read(&mut payload)?;
            let factory = self
                .factories
                .get(&header.type_id)
                .ok_or(Error::UnknownMessageType(header.type_id))?;
            let body = factory(&mut payload)?;

            self.deliver(ReceivedMessage::new(header, body));
        }

        Ok(Some(packet.header.acks()))
    }

    pub fn build_next_header(&self) -> PacketHeader {
        self.packets.build_next_header()
    }

    pub fn take_received(&mut self) -> Vec<ReceivedMessage> {
        self.policy.take_received()
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    fn deliver(&mut self, message: ReceivedMessage) {
        let uid = message.uid();
        let seen = if message.is_reliable() {
            &mut self.seen_reliable
        } else {
            &mut self.seen_unreliable
        };

        if seen.contains(uid) {
            log::trace!("dropping duplicate message {uid}");
            return;
        }
        seen.insert(uid, ());

        log::trace!(
            "delivering {} message {uid} of type {}",
            if message.is_reliable() { "reliable" } else { "unreliable" },
            message.type_id()
        );
        self.policy.on_message_received(message);
    }
}

impl<P: fmt::Debug> fmt::Debug for MessageReceiver<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut type_ids: Vec<_> = self.factories.keys().collect();
        type_ids.sort_unstable();

        f.debug_struct("MessageReceiver")
            .field("packets", &self.packets)
            .field("type_ids", &type_ids)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
