//! Messages and the envelope that frames them inside a packet payload.
//!
//! Application types implement [`Message`] to supply their body encoding.
//! The envelope ([`MessageHeader`]) is owned by the engine; a message body
//! never sees its own type id, uid or reliability flag.

use std::any::Any;
use std::fmt;

use bytes::{Bytes, BytesMut};

mod header;

pub use header::{MessageHeader, Reliability};

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("message truncated: {0}")]
    Truncated(#[from] bytes::TryGetError),
    #[error("reliability flag must be 0 or 1, got {0}")]
    InvalidReliabilityFlag(u8),
    #[error("{0}")]
    Malformed(String),
}

pub trait Message: Send + 'static {
    fn encode(&self, buf: &mut BytesMut);

    /// Reads exactly this message's body from the front of `buf`.
    fn decode(buf: &mut Bytes) -> Result<Self, DecodeError>
    where
        Self: Sized;
}

/// Turns the bytes following an envelope into a boxed message.
pub type MessageFactory =
    Box<dyn Fn(&mut Bytes) -> Result<Box<dyn Any + Send>, DecodeError> + Send>;

pub fn factory_for<M: Message>() -> MessageFactory {
    Box::new(|buf| M::decode(buf).map(|m| Box::new(m) as Box<dyn Any + Send>))
}

/// A queued message: envelope plus its already encoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub header: MessageHeader,
    pub body: Bytes,
}

impl OutgoingMessage {
    pub fn new(header: MessageHeader, body: Bytes) -> Self {
        Self { header, body }
    }

    pub fn encode<M: Message>(type_id: u16, reliability: Reliability, message: &M) -> Self {
        let mut body = BytesMut::new();
        message.encode(&mut body);
        Self {
            header: MessageHeader::new(type_id, reliability, 0),
            body: body.freeze(),
        }
    }

    pub fn wire_len(&self) -> usize {
        MessageHeader::SIZE + self.body.len()
    }

    pub fn write(&self, buf: &mut BytesMut) {
        self.header.write(buf);
        buf.extend_from_slice(&self.body);
    }
}

/// A decoded message handed to the application.
pub struct ReceivedMessage {
    pub header: MessageHeader,
    body: Box<dyn Any + Send>,
}

impl ReceivedMessage {
    pub fn new(header: MessageHeader, body: Box<dyn Any + Send>) -> Self {
        Self { header, body }
    }

    pub fn uid(&self) -> u16 {
        self.header.uid
    }

    pub fn type_id(&self) -> u16 {
        self.header.type_id
    }

    pub fn is_reliable(&self) -> bool {
        self.header.is_reliable()
    }

    pub fn is<M: Message>(&self) -> bool {
        self.body.is::<M>()
    }

    pub fn downcast_ref<M: Message>(&self) -> Option<&M> {
        self.body.downcast_ref()
    }

    /// Gives the message back unchanged when `M` is the wrong type.
    pub fn downcast<M: Message>(self) -> Result<M, Self> {
        match self.body.downcast::<M>() {
            Ok(body) => Ok(*body),
            Err(body) => Err(Self {
                header: self.header,
                body,
            }),
        }
    }
}

impl fmt::Debug for ReceivedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceivedMessage")
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}
