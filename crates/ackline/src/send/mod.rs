mod packer;
mod reliable;
mod sender;
mod unreliable;

pub use packer::{MAX_PAYLOAD_SIZE, PayloadPacker};
pub use reliable::{PendingMessage, RETRANSMIT_DELAY, ReliableMessageSender};
pub use sender::MessageSender;
pub use unreliable::UnreliableMessageSender;
