use bytes::{Bytes, BytesMut};

use crate::message::OutgoingMessage;

/// Payload budget per packet, small enough to avoid IP fragmentation on a
/// typical Ethernet path.
pub const MAX_PAYLOAD_SIZE: usize = 508;

/// Accumulates back-to-back messages into one packet payload.
#[derive(Debug)]
pub struct PayloadPacker {
    buf: BytesMut,
    max_size: usize,
    full: bool,
}

impl Default for PayloadPacker {
    fn default() -> Self {
        Self::new(MAX_PAYLOAD_SIZE)
    }
}

impl PayloadPacker {
    pub fn new(max_size: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(max_size),
            max_size,
            full: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.full
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Appends the message if it fits. A message larger than the budget is
    /// still taken when the packer is empty, and then fills it.
    pub fn try_pack(&mut self, message: &OutgoingMessage) -> bool {
        if self.full {
            return false;
        }

        let mark = self.buf.len();
        message.write(&mut self.buf);

        if self.buf.len() <= self.max_size {
            return true;
        }

        if mark == 0 {
            self.full = true;
            true
        } else {
            self.buf.truncate(mark);
            false
        }
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::tests::TestMessage;
    use crate::message::{MessageHeader, Reliability};

    fn message(uid: u16, data_len: usize) -> OutgoingMessage {
        let mut message = OutgoingMessage::encode(
            0,
            Reliability::Reliable,
            &TestMessage::new(uid as i32, vec![uid as u8; data_len]),
        );
        message.header.uid = uid;
        message
    }

    fn uids_in(payload: Bytes) -> Vec<u16> {
        use crate::message::Message;

        let mut payload = payload;
        let mut uids = Vec::new();
        while !payload.is_empty() {
            let header = MessageHeader::read(&mut payload).unwrap();
            TestMessage::decode(&mut payload).unwrap();
            uids.push(header.uid);
        }
        uids
    }

    #[test]
    fn test_packs_into_three_packets() {
        let mut pending = vec![
            message(1, 236),
            message(2, 1000),
            message(3, 300),
            message(4, 246),
        ];
        let mut packets = Vec::new();

        while !pending.is_empty() {
            let mut packer = PayloadPacker::default();
            pending.retain(|m| !packer.try_pack(m));
            packets.push(uids_in(packer.into_bytes()));
        }

        assert_eq!(packets, vec![vec![1, 4], vec![2], vec![3]]);
    }

    #[test]
    fn test_oversized_message_fills_packer() {
        let mut packer = PayloadPacker::default();

        assert!(packer.try_pack(&message(1, 1000)));
        assert!(packer.is_full());
        assert!(!packer.try_pack(&message(2, 1)));
        assert_eq!(packer.len(), message(1, 1000).wire_len());
    }

    #[test]
    fn test_rollback_leaves_packer_untouched() {
        let mut packer = PayloadPacker::default();
        assert!(packer.is_empty());

        assert!(packer.try_pack(&message(1, 400)));
        let before = packer.len();

        assert!(!packer.try_pack(&message(2, 200)));
        assert_eq!(packer.len(), before);
        assert!(!packer.is_full());

        assert!(packer.try_pack(&message(3, 10)));
        assert_eq!(uids_in(packer.into_bytes()), vec![1, 3]);
    }

    #[test]
    fn test_exact_fit() {
        // 5 envelope + 6 body prefix + 497 data
        let mut packer = PayloadPacker::default();
        assert!(packer.try_pack(&message(1, MAX_PAYLOAD_SIZE - 11)));
        assert_eq!(packer.len(), MAX_PAYLOAD_SIZE);
        assert!(!packer.is_full());
        assert!(!packer.try_pack(&message(2, 0)));
    }
}
