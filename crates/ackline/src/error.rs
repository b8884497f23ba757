use std::io;

use crate::message::DecodeError;
use crate::packet::PacketError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed packet: {0}")]
    Framing(#[from] PacketError),
    #[error("no message factory registered for type id {0}")]
    UnknownMessageType(u16),
    #[error("message type id {0} is already registered")]
    DuplicateRegistration(u16),
    #[error("message type `{0}` has not been registered")]
    TypeNotRegistered(&'static str),
    #[error("reliable backlog full, {0} messages await an ack")]
    BacklogFull(usize),
    #[error("invalid endpoint config: {0}")]
    InvalidConfig(String),
    #[error("failed to decode message: {0}")]
    Decode(#[from] DecodeError),
    #[error("transport failure: {0}")]
    Transport(#[from] io::Error),
}
