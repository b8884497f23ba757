//! Packet framing.
//!
//! Every datagram starts with an 8 byte header, all integers little endian:
//!
//! ```text
//!  0       2        4                8
//! +-------+--------+----------------+-----------------
//! |  seq  |last_ack|    ack_bits    |  payload ...
//! +-------+--------+----------------+-----------------
//! ```
//!
//! Bit `i` of `ack_bits` acknowledges sequence `last_ack - (i + 1)`.
//! `last_ack` itself is always treated as acknowledged.

use bytes::{Buf, BufMut, Bytes, BytesMut};

pub const ACK_BITS: u16 = 32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacketHeader {
    pub sequence: u16,
    pub last_ack: u16,
    pub ack_bits: u32,
}

impl PacketHeader {
    pub const SIZE: usize = 8;

    pub fn new(sequence: u16, last_ack: u16, ack_bits: u32) -> Self {
        Self {
            sequence,
            last_ack,
            ack_bits,
        }
    }

    pub fn write(&self, buf: &mut BytesMut) {
        buf.put_u16_le(self.sequence);
        buf.put_u16_le(self.last_ack);
        buf.put_u32_le(self.ack_bits);
    }

    pub fn read(buf: &mut impl Buf) -> Result<Self, PacketError> {
        if buf.remaining() < Self::SIZE {
            return Err(PacketError::TooShort {
                len: buf.remaining(),
            });
        }

        Ok(Self {
            sequence: buf.get_u16_le(),
            last_ack: buf.get_u16_le(),
            ack_bits: buf.get_u32_le(),
        })
    }

    /// Sequences acknowledged by this header, most recent first.
    pub fn acks(&self) -> Vec<u16> {
        let mut acks = Vec::with_capacity(ACK_BITS as usize + 1);
        acks.push(self.last_ack);

        for i in 0..ACK_BITS {
            if self.ack_bits & (1 << i) != 0 {
                acks.push(self.last_ack.wrapping_sub(i + 1));
            }
        }

        acks
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub header: PacketHeader,
    pub payload: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PacketError {
    #[error("datagram of {len} bytes is shorter than the packet header")]
    TooShort { len: usize },
}

impl Packet {
    pub fn encode(header: &PacketHeader, payload: &[u8]) -> Bytes {
        let mut buf = BytesMut::with_capacity(PacketHeader::SIZE + payload.len());
        header.write(&mut buf);
        buf.put_slice(payload);
        buf.freeze()
    }

    /// Splits a datagram into its header and a view of the remaining bytes.
    pub fn decode(mut datagram: Bytes) -> Result<Self, PacketError> {
        let header = PacketHeader::read(&mut datagram)?;
        Ok(Self {
            header,
            payload: datagram,
        })
    }
}

impl TryFrom<Bytes> for Packet {
    type Error = PacketError;

    fn try_from(datagram: Bytes) -> Result<Self, Self::Error> {
        Self::decode(datagram)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_header_roundtrip() {
        let header = PacketHeader::new(23, 225, 23);
        let payload = [5u8, 6, 7, 8];

        let packet = Packet::decode(Packet::encode(&header, &payload)).unwrap();

        assert_eq!(packet.header, header);
        assert_eq!(&packet.payload[..], &payload);
    }

    #[test]
    fn test_header_is_little_endian() {
        let header = PacketHeader::new(0x0102, 0x0304, 0x0506_0708);
        let bytes = Packet::encode(&header, &[0xAA]);

        assert_eq!(
            &bytes[..],
            &[0x02, 0x01, 0x04, 0x03, 0x08, 0x07, 0x06, 0x05, 0xAA]
        );
    }

    #[test]
    fn test_empty_payload() {
        let header = PacketHeader::new(324, 23, 12334);
        let packet = Packet::try_from(Packet::encode(&header, &[])).unwrap();

        assert_eq!(packet.header, header);
        assert!(packet.payload.is_empty());
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(7)]
    fn test_short_datagram_is_rejected(#[case] len: usize) {
        let datagram = Bytes::from(vec![0u8; len]);
        assert_eq!(Packet::decode(datagram), Err(PacketError::TooShort { len }));
    }

    #[rstest]
    #[case(
        10,
        0b0001_0100_0100_0001_1000_0100_0110_1000,
        vec![10, 6, 4, 3, 65535, 65530, 65529, 65523, 65519, 65517]
    )]
    #[case(
        0,
        0b0001_0100_0100_0001_1000_0100_0110_1001,
        vec![0, 65535, 65532, 65530, 65529, 65525, 65520, 65519, 65513, 65509, 65507]
    )]
    #[case(
        1,
        0b0001_0100_0100_0001_1000_0100_0110_1001,
        vec![1, 0, 65533, 65531, 65530, 65526, 65521, 65520, 65514, 65510, 65508]
    )]
    #[case(500, 0, vec![500])]
    fn test_acks(#[case] last_ack: u16, #[case] ack_bits: u32, #[case] expected: Vec<u16>) {
        let header = PacketHeader::new(0, last_ack, ack_bits);
        assert_eq!(header.acks(), expected);
    }

    #[test]
    fn test_acks_survive_the_wire() {
        let header = PacketHeader::new(9, 10, 0b0001_0100_0100_0001_1000_0100_0110_1000);
        let decoded = Packet::decode(Packet::encode(&header, b"xyz")).unwrap();

        assert_eq!(decoded.header.acks(), header.acks());
        assert_eq!(decoded.header.acks()[0], 10);
    }
}
