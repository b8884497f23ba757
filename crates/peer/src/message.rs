use ackline::{DecodeError, Message};
use bytes::{Buf, BufMut, Bytes, BytesMut};

pub const CHAT_MESSAGE: u16 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub from: String,
    pub text: String,
}

impl Message for ChatMessage {
    fn encode(&self, buf: &mut BytesMut) {
        put_string(buf, &self.from);
        put_string(buf, &self.text);
    }

    fn decode(buf: &mut Bytes) -> Result<Self, DecodeError> {
        Ok(Self {
            from: get_string(buf)?,
            text: get_string(buf)?,
        })
    }
}

// u16 length prefix, longer strings are cut at a char boundary
fn put_string(buf: &mut BytesMut, value: &str) {
    let mut end = value.len().min(u16::MAX as usize);
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    buf.put_u16_le(end as u16);
    buf.put_slice(&value.as_bytes()[..end]);
}

fn get_string(buf: &mut Bytes) -> Result<String, DecodeError> {
    let len = buf.try_get_u16_le()? as usize;
    if buf.remaining() < len {
        return Err(DecodeError::Malformed(format!(
            "string of {len} bytes with {} left",
            buf.remaining()
        )));
    }

    String::from_utf8(buf.split_to(len).to_vec())
        .map_err(|e| DecodeError::Malformed(e.to_string()))
}
