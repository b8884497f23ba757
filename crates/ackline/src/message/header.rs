use bytes::{Buf, BufMut, BytesMut};

use super::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reliability {
    Unreliable,
    Reliable,
}

impl Reliability {
    pub fn is_reliable(&self) -> bool {
        matches!(self, Self::Reliable)
    }

    fn to_wire(self) -> u8 {
        match self {
            Self::Unreliable => 0,
            Self::Reliable => 1,
        }
    }

    fn from_wire(flag: u8) -> Result<Self, DecodeError> {
        match flag {
            0 => Ok(Self::Unreliable),
            1 => Ok(Self::Reliable),
            other => Err(DecodeError::InvalidReliabilityFlag(other)),
        }
    }
}

impl From<bool> for Reliability {
    fn from(reliable: bool) -> Self {
        if reliable {
            Self::Reliable
        } else {
            Self::Unreliable
        }
    }
}

/// Envelope written in front of every message body.
///
/// `type_id: u16 | reliable: u8 | uid: u16`, little endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub type_id: u16,
    pub reliability: Reliability,
    pub uid: u16,
}

impl MessageHeader {
    pub const SIZE: usize = 5;

    pub fn new(type_id: u16, reliability: Reliability, uid: u16) -> Self {
        Self {
            type_id,
            reliability,
            uid,
        }
    }

    pub fn is_reliable(&self) -> bool {
        self.reliability.is_reliable()
    }

    pub fn write(&self, buf: &mut BytesMut) {
        buf.put_u16_le(self.type_id);
        buf.put_u8(self.reliability.to_wire());
        buf.put_u16_le(self.uid);
    }

    pub fn read(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        let type_id = buf.try_get_u16_le()?;
        let reliability = Reliability::from_wire(buf.try_get_u8()?)?;
        let uid = buf.try_get_u16_le()?;

        Ok(Self {
            type_id,
            reliability,
            uid,
        })
    }
}
