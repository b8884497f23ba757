use super::DeliveryPolicy;
use crate::message::ReceivedMessage;
use crate::sequence::{DEFAULT_BUFFER_CAPACITY, SequenceBuffer};

/// Releases reliable messages strictly in uid order, holding back anything
/// that arrives ahead of a gap. Unreliable messages are released on every
/// drain, sorted by uid among themselves, after the reliable run.
#[derive(Debug)]
pub struct OrderedDelivery {
    reliable: SequenceBuffer<ReceivedMessage>,
    next_reliable_uid: u16,
    unreliable: Vec<ReceivedMessage>,
}

impl Default for OrderedDelivery {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}

impl OrderedDelivery {
    pub fn new(capacity: usize) -> Self {
        Self {
            reliable: SequenceBuffer::new(capacity),
            next_reliable_uid: 0,
            unreliable: Vec::new(),
        }
    }

    pub fn next_reliable_uid(&self) -> u16 {
        self.next_reliable_uid
    }
}

impl DeliveryPolicy for OrderedDelivery {
    fn on_message_received(&mut self, message: ReceivedMessage) {
        if message.is_reliable() {
            self.reliable.insert(message.uid(), message);
        } else {
            let uid = message.uid();
            let at = self.unreliable.partition_point(|m| m.uid() <= uid);
            self.unreliable.insert(at, message);
        }
    }

    fn take_received(&mut self) -> Vec<ReceivedMessage> {
        let mut drained = Vec::new();

        while let Some(message) = self.reliable.remove(self.next_reliable_uid) {
            drained.push(message);
            self.next_reliable_uid = self.next_reliable_uid.wrapping_add(1);
        }

        drained.append(&mut self.unreliable);
        drained
    }
}
