#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EndpointStats {
    pub packets_sent: u64,
    pub packets_received: u64,
    pub messages_delivered: u64,
    /// Datagrams too short to carry a packet header.
    pub malformed_packets: u64,
    /// Packets whose payload stopped decoding part way through.
    pub undecodable_packets: u64,
}
