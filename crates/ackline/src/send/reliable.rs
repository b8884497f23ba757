use super::packer::PayloadPacker;
use crate::error::{Error, Result};
use crate::message::{OutgoingMessage, Reliability};
use crate::sequence::{DEFAULT_BUFFER_CAPACITY, SequenceBuffer};

/// Time a reliable message waits for an ack before it is packed again.
pub const RETRANSMIT_DELAY: i64 = 100;

#[derive(Debug, Clone)]
pub struct PendingMessage {
    pub message: OutgoingMessage,
    pub acked: bool,
    pub last_sent: Option<i64>,
}

impl PendingMessage {
    fn is_due(&self, now: i64, delay: i64) -> bool {
        // never twice in the same tick, whatever the delay
        !self.acked
            && self
                .last_sent
                .is_none_or(|sent| sent != now && now - sent >= delay)
    }
}

/// Keeps reliable messages until a packet carrying them is acknowledged,
/// resending each one at most once per retransmit delay.
#[derive(Debug)]
pub struct ReliableMessageSender {
    backlog: SequenceBuffer<PendingMessage>,
    packet_messages: SequenceBuffer<Vec<u16>>,
    next_uid: u16,
    oldest_unacked_uid: u16,
    retransmit_delay: i64,
}

impl Default for ReliableMessageSender {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY, RETRANSMIT_DELAY)
    }
}

impl ReliableMessageSender {
    pub fn new(capacity: usize, retransmit_delay: i64) -> Self {
        Self {
            backlog: SequenceBuffer::new(capacity),
            packet_messages: SequenceBuffer::new(capacity),
            next_uid: 0,
            oldest_unacked_uid: 0,
            retransmit_delay,
        }
    }

    /// Fails with [`Error::BacklogFull`] while `capacity` messages are still
    /// waiting for an ack. Nothing is queued in that case.
    pub fn queue(&mut self, mut message: OutgoingMessage) -> Result<u16> {
        let in_flight = self.next_uid.wrapping_sub(self.oldest_unacked_uid) as usize;
        if in_flight >= self.backlog.capacity() {
            return Err(Error::BacklogFull(in_flight));
        }

        let uid = self.next_uid;
        message.header.reliability = Reliability::Reliable;
        message.header.uid = uid;

        self.backlog.insert(
            uid,
            PendingMessage {
                message,
                acked: false,
                last_sent: None,
            },
        );
        self.next_uid = uid.wrapping_add(1);

        Ok(uid)
    }

    /// Packs every message that is unacked and due, oldest first. Returns the
    /// uids that went into this payload.
    pub fn add_to_payload(&mut self, packer: &mut PayloadPacker, now: i64) -> Vec<u16> {
        let mut packed = Vec::new();
        let mut uid = self.oldest_unacked_uid;

        while uid != self.next_uid && !packer.is_full() {
            let Some(pending) = self.backlog.get_mut(uid) else {
                break;
            };

            if pending.is_due(now, self.retransmit_delay) && packer.try_pack(&pending.message) {
                pending.last_sent = Some(now);
                packed.push(uid);
            }

            uid = uid.wrapping_add(1);
        }

        packed
    }

    pub fn on_packet_sent(&mut self, sequence: u16, uids: Vec<u16>) {
        if !uids.is_empty() {
            self.packet_messages.insert(sequence, uids);
        }
    }

    /// Marks the messages carried by each acknowledged packet as delivered.
    pub fn ack(&mut self, packet_sequences: &[u16]) {
        for &sequence in packet_sequences {
            let Some(uids) = self.packet_messages.remove(sequence) else {
                continue;
            };

            for uid in uids {
                if let Some(pending) = self.backlog.get_mut(uid) {
                    if !pending.acked {
                        log::trace!("message {uid} acked by packet {sequence}");
                    }
                    pending.acked = true;
                }
            }
        }

        self.advance_oldest();
    }

    pub fn oldest_unacked_uid(&self) -> u16 {
        self.oldest_unacked_uid
    }

    pub fn next_uid(&self) -> u16 {
        self.next_uid
    }

    /// Messages still waiting for an ack.
    pub fn pending_count(&self) -> usize {
        let window = self.next_uid.wrapping_sub(self.oldest_unacked_uid);
        (0..window)
            .map(|offset| self.oldest_unacked_uid.wrapping_add(offset))
            .filter(|&uid| self.backlog.get(uid).is_some_and(|p| !p.acked))
            .count()
    }

    pub fn is_idle(&self) -> bool {
        self.oldest_unacked_uid == self.next_uid
    }

    fn advance_oldest(&mut self) {
        while self.oldest_unacked_uid != self.next_uid
            && self
                .backlog
                .get(self.oldest_unacked_uid)
                .is_some_and(|p| p.acked)
        {
            self.backlog.remove(self.oldest_unacked_uid);
            self.oldest_unacked_uid = self.oldest_unacked_uid.wrapping_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageHeader;
    use crate::message::tests::TestMessage;

    fn outgoing(id: i32) -> OutgoingMessage {
        OutgoingMessage::encode(0, Reliability::Unreliable, &TestMessage::new(id, vec![1, 2, 3]))
    }

    fn send(sender: &mut ReliableMessageSender, sequence: u16, now: i64) -> Vec<u16> {
        let mut packer = PayloadPacker::default();
        let uids = sender.add_to_payload(&mut packer, now);
        sender.on_packet_sent(sequence, uids.clone());
        uids
    }

    #[test]
    fn test_queue_stamps_envelope() {
        let mut sender = ReliableMessageSender::default();

        assert_eq!(sender.queue(outgoing(1)).unwrap(), 0);
        assert_eq!(sender.queue(outgoing(2)).unwrap(), 1);

        let mut packer = PayloadPacker::default();
        sender.add_to_payload(&mut packer, 0);
        let mut payload = packer.into_bytes();
        let header = MessageHeader::read(&mut payload).unwrap();
        assert_eq!(header.reliability, Reliability::Reliable);
        assert_eq!(header.uid, 0);
    }

    #[test]
    fn test_retransmit_timing() {
        let mut sender = ReliableMessageSender::default();
        sender.queue(outgoing(1)).unwrap();
        sender.queue(outgoing(2)).unwrap();

        assert_eq!(send(&mut sender, 0, 0), vec![0, 1]);
        assert!(send(&mut sender, 1, 50).is_empty());
        assert_eq!(send(&mut sender, 2, 100), vec![0, 1]);

        sender.ack(&[2]);
        assert!(sender.is_idle());
        assert!(send(&mut sender, 3, 200).is_empty());
    }

    #[test]
    fn test_longer_retransmit_scenario() {
        let mut sender = ReliableMessageSender::default();
        sender.queue(outgoing(1)).unwrap();

        assert_eq!(send(&mut sender, 0, 0), vec![0]);
        assert!(send(&mut sender, 1, 50).is_empty());
        sender.queue(outgoing(2)).unwrap();
        assert_eq!(send(&mut sender, 2, 75), vec![1]);
        assert_eq!(send(&mut sender, 3, 100), vec![0]);
        assert!(send(&mut sender, 4, 149).is_empty());
        assert!(send(&mut sender, 5, 150).is_empty());
        assert_eq!(send(&mut sender, 6, 175), vec![1]);

        // acking an older copy is enough
        sender.ack(&[2, 3]);
        assert_eq!(sender.pending_count(), 0);
        assert!(send(&mut sender, 7, 225).is_empty());
        assert!(send(&mut sender, 8, 300).is_empty());
        assert!(send(&mut sender, 9, 400).is_empty());
    }

    #[test]
    fn test_ack_out_of_order_keeps_cursor() {
        let mut sender = ReliableMessageSender::default();
        for id in 0..3 {
            sender.queue(outgoing(id)).unwrap();
        }

        // each message in its own packet
        for (sequence, expected) in [(10u16, 0u16), (11, 1), (12, 2)] {
            let mut packer = PayloadPacker::new(20);
            let uids = sender.add_to_payload(&mut packer, 0);
            assert_eq!(uids, vec![expected]);
            sender.on_packet_sent(sequence, uids);
        }

        sender.ack(&[11, 12]);
        assert_eq!(sender.oldest_unacked_uid(), 0);
        assert_eq!(sender.pending_count(), 1);

        // acked messages are not resent
        assert_eq!(send(&mut sender, 13, 100), vec![0]);

        sender.ack(&[10]);
        assert_eq!(sender.oldest_unacked_uid(), 3);
        assert!(sender.is_idle());
    }

    #[test]
    fn test_unknown_ack_is_ignored() {
        let mut sender = ReliableMessageSender::default();
        sender.queue(outgoing(1)).unwrap();
        send(&mut sender, 0, 0);

        sender.ack(&[500, 65535]);
        assert_eq!(sender.pending_count(), 1);
    }

    #[test]
    fn test_backlog_spills_into_next_packet() {
        let mut sender = ReliableMessageSender::default();
        for id in 0..100 {
            sender.queue(outgoing(id)).unwrap();
        }

        // 5 envelope + 6 prefix + 3 data
        let first = send(&mut sender, 0, 0);
        assert_eq!(first.len(), MAX_PER_PACKET);
        let second = send(&mut sender, 1, 0);
        assert_eq!(second[0], MAX_PER_PACKET as u16);
    }

    const MAX_PER_PACKET: usize = crate::send::MAX_PAYLOAD_SIZE / 14;

    #[test]
    fn test_full_backlog_rejects_until_acked() {
        let mut sender = ReliableMessageSender::new(4, RETRANSMIT_DELAY);
        for id in 0..4 {
            sender.queue(outgoing(id)).unwrap();
        }

        assert!(matches!(
            sender.queue(outgoing(4)),
            Err(Error::BacklogFull(4))
        ));
        assert_eq!(sender.next_uid(), 4);
        assert_eq!(sender.oldest_unacked_uid(), 0);
        assert_eq!(send(&mut sender, 0, 0), vec![0, 1, 2, 3]);

        sender.ack(&[0]);
        assert!(sender.is_idle());
        assert_eq!(sender.queue(outgoing(4)).unwrap(), 4);
        assert_eq!(send(&mut sender, 1, 0), vec![4]);
    }

    #[test]
    fn test_zero_delay_packs_once_per_tick() {
        let mut sender = ReliableMessageSender::new(16, 0);
        sender.queue(outgoing(1)).unwrap();

        assert_eq!(send(&mut sender, 0, 10), vec![0]);
        assert!(send(&mut sender, 1, 10).is_empty());
        assert_eq!(send(&mut sender, 2, 11), vec![0]);
    }
}
