mod header;
mod receiver;
mod sender;

pub use header::{ACK_BITS, Packet, PacketError, PacketHeader};
pub use receiver::PacketReceiver;
pub use sender::PacketSender;
