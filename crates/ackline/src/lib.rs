pub mod clock;
pub mod endpoint;
pub mod error;
pub mod message;
pub mod packet;
pub mod receive;
pub mod send;
pub mod sequence;
pub mod stats;
pub mod transport;

pub use clock::{Clock, ManualClock, SystemClock};
pub use endpoint::{Endpoint, EndpointConfig};
pub use error::{Error, Result};
pub use message::{
    DecodeError, Message, MessageFactory, MessageHeader, OutgoingMessage, ReceivedMessage,
    Reliability, factory_for,
};
pub use packet::{Packet, PacketError, PacketHeader, PacketReceiver, PacketSender};
pub use receive::{DeliveryPolicy, MessageReceiver, OrderedDelivery, UnorderedDelivery};
pub use send::{
    MAX_PAYLOAD_SIZE, MessageSender, PayloadPacker, RETRANSMIT_DELAY, ReliableMessageSender,
    UnreliableMessageSender,
};
pub use sequence::{DEFAULT_BUFFER_CAPACITY, MAX_BUFFER_CAPACITY, SequenceBuffer};
pub use stats::EndpointStats;
pub use transport::{
    LossyTransport, MemoryTransport, PacketLossSimulation, Transport, UdpTransport,
};
