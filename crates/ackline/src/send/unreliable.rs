use std::collections::VecDeque;

use super::packer::PayloadPacker;
use crate::message::{OutgoingMessage, Reliability};

/// Fire-and-forget queue. A message leaves the queue the first time it is
/// packed and is never resent.
#[derive(Debug, Default)]
pub struct UnreliableMessageSender {
    queue: VecDeque<OutgoingMessage>,
    next_uid: u16,
}

impl UnreliableMessageSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&mut self, mut message: OutgoingMessage) -> u16 {
        let uid = self.next_uid;
        self.next_uid = uid.wrapping_add(1);

        message.header.reliability = Reliability::Unreliable;
        message.header.uid = uid;
        self.queue.push_back(message);

        uid
    }

    /// Messages that did not fit stay queued, in order, for the next packet.
    pub fn add_to_payload(&mut self, packer: &mut PayloadPacker, _now: i64) {
        self.queue.retain(|message| !packer.try_pack(message));
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
