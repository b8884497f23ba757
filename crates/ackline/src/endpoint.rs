use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::message::{Message, MessageHeader, ReceivedMessage, Reliability, factory_for};
use crate::receive::{DeliveryPolicy, MessageReceiver, OrderedDelivery, UnorderedDelivery};
use crate::send::{MAX_PAYLOAD_SIZE, MessageSender, RETRANSMIT_DELAY};
use crate::sequence::{DEFAULT_BUFFER_CAPACITY, MAX_BUFFER_CAPACITY};
use crate::stats::EndpointStats;
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Slots in every sequence buffer: ack history, reliable backlog and
    /// duplicate filters.
    pub buffer_capacity: usize,
    pub max_payload_size: usize,
    /// In the clock's units.
    pub retransmit_delay: i64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            max_payload_size: MAX_PAYLOAD_SIZE,
            retransmit_delay: RETRANSMIT_DELAY,
        }
    }
}

impl EndpointConfig {
    pub fn validate(&self) -> Result<()> {
        if self.buffer_capacity == 0 || self.buffer_capacity > MAX_BUFFER_CAPACITY {
            return Err(Error::InvalidConfig(format!(
                "buffer_capacity must be within 1..={MAX_BUFFER_CAPACITY}, got {}",
                self.buffer_capacity
            )));
        }
        if self.max_payload_size <= MessageHeader::SIZE {
            return Err(Error::InvalidConfig(format!(
                "max_payload_size must exceed the {} byte message header, got {}",
                MessageHeader::SIZE,
                self.max_payload_size
            )));
        }
        if self.retransmit_delay <= 0 {
            return Err(Error::InvalidConfig(format!(
                "retransmit_delay must be positive, got {}",
                self.retransmit_delay
            )));
        }

        Ok(())
    }
}

/// One side of a link: a message sender and receiver sharing a transport and
/// a clock.
///
/// Drive it from a single loop: [`receive_messages`](Self::receive_messages)
/// to pull everything that arrived, then [`send_queued`](Self::send_queued) to
/// flush what was queued. Nothing happens between calls.
#[derive(Debug)]
pub struct Endpoint<T, C, P = OrderedDelivery> {
    transport: T,
    clock: C,
    sender: MessageSender,
    receiver: MessageReceiver<P>,
    config: EndpointConfig,
    stats: EndpointStats,
}

impl<T: Transport, C: Clock> Endpoint<T, C, OrderedDelivery> {
    pub fn ordered(transport: T, clock: C) -> Self {
        let config = EndpointConfig::default();
        Self::build(
            transport,
            clock,
            OrderedDelivery::new(config.buffer_capacity),
            config,
        )
    }
}

impl<T: Transport, C: Clock> Endpoint<T, C, UnorderedDelivery> {
    pub fn unordered(transport: T, clock: C) -> Self {
        Self::build(
            transport,
            clock,
            UnorderedDelivery::default(),
            EndpointConfig::default(),
        )
    }
}

impl<T: Transport, C: Clock, P: DeliveryPolicy> Endpoint<T, C, P> {
    /// Fails with [`Error::InvalidConfig`] unless `config` passes
    /// [`EndpointConfig::validate`].
    pub fn with_config(
        transport: T,
        clock: C,
        policy: P,
        config: EndpointConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(transport, clock, policy, config))
    }

    fn build(transport: T, clock: C, policy: P, config: EndpointConfig) -> Self {
        Self {
            transport,
            clock,
            sender: MessageSender::new(
                config.buffer_capacity,
                config.max_payload_size,
                config.retransmit_delay,
            ),
            receiver: MessageReceiver::new(config.buffer_capacity, policy),
            config,
            stats: EndpointStats::default(),
        }
    }

    /// Binds `M` to `type_id` for both sending and receiving. Both peers must
    /// use the same ids.
    pub fn register<M: Message>(&mut self, type_id: u16) -> Result<()> {
        self.sender.register::<M>(type_id)?;
        self.receiver.register_factory(type_id, factory_for::<M>())
    }

    /// A reliable message is refused with [`Error::BacklogFull`] while
    /// `buffer_capacity` reliable messages wait for an ack. Keep calling
    /// [`receive_messages`](Self::receive_messages) and retry.
    pub fn queue<M: Message>(&mut self, message: &M, reliability: Reliability) -> Result<u16> {
        self.sender.queue(message, reliability)
    }

    pub fn send_queued(&mut self) -> Result<usize> {
        let now = self.clock.now();
        let header = self.receiver.build_next_header();

        let sent = self.sender.send_queued(&mut self.transport, now, header)?;
        self.stats.packets_sent += sent as u64;

        Ok(sent)
    }

    /// Reads every waiting packet, applies its acks, and returns the messages
    /// the delivery policy releases.
    ///
    /// A packet that fails to frame or decode is logged and skipped. Only
    /// transport failures are returned.
    pub fn receive_messages(&mut self) -> Result<Vec<ReceivedMessage>> {
        loop {
            match self.receiver.receive_next_packet(&mut self.transport) {
                Ok(Some(acks)) => {
                    self.stats.packets_received += 1;
                    self.sender.ack(&acks);
                }
                Ok(None) => break,
                Err(Error::Framing(err)) => {
                    self.stats.malformed_packets += 1;
                    log::warn!("discarding datagram: {err}");
                }
                Err(err @ (Error::UnknownMessageType(_) | Error::Decode(_))) => {
                    self.stats.packets_received += 1;
                    self.stats.undecodable_packets += 1;
                    log::warn!("rest of packet skipped: {err}");
                }
                Err(err) => return Err(err),
            }
        }

        let messages = self.receiver.take_received();
        self.stats.messages_delivered += messages.len() as u64;
        Ok(messages)
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    pub fn stats(&self) -> &EndpointStats {
        &self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn policy(&self) -> &P {
        self.receiver.policy()
    }

    /// Reliable messages queued or in flight that have not been acked.
    pub fn pending_reliable(&self) -> usize {
        self.sender.reliable().pending_count()
    }

    pub fn pending_unreliable(&self) -> usize {
        self.sender.unreliable().len()
    }
}
