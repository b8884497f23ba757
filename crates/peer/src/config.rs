use std::time::Duration;

use ackline::{EndpointConfig, PacketLossSimulation, Reliability};

#[derive(Debug, Clone)]
pub struct PeerConfig {
    pub name: String,
    pub interval: Duration,
    /// Greetings to send before exiting. `None` runs until killed.
    pub count: Option<u32>,
    pub reliability: Reliability,
    pub endpoint: EndpointConfig,
    pub packet_loss: PacketLossSimulation,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            name: "peer".to_string(),
            interval: Duration::from_millis(500),
            count: None,
            reliability: Reliability::Reliable,
            endpoint: EndpointConfig::default(),
            packet_loss: PacketLossSimulation::default(),
        }
    }
}
