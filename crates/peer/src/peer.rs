use std::thread;

use ackline::{
    DeliveryPolicy, Endpoint, Error, LossyTransport, Result, SystemClock, UdpTransport,
};

use crate::config::PeerConfig;
use crate::message::{CHAT_MESSAGE, ChatMessage};

type Link = LossyTransport<UdpTransport>;

pub struct ChatPeer<P> {
    endpoint: Endpoint<Link, SystemClock, P>,
    config: PeerConfig,
    sent: u32,
}

impl<P: DeliveryPolicy> ChatPeer<P> {
    pub fn new(endpoint: Endpoint<Link, SystemClock, P>, config: PeerConfig) -> Result<Self> {
        let mut endpoint = endpoint;
        endpoint.register::<ChatMessage>(CHAT_MESSAGE)?;

        Ok(Self {
            endpoint,
            config,
            sent: 0,
        })
    }

    pub fn run(&mut self) {
        while !self.is_done() {
            if let Err(err) = self.tick_once() {
                log::error!("tick failed: {err}");
            }
            thread::sleep(self.config.interval);
        }

        // give outstanding reliable messages a last chance
        if let Err(err) = self.tick_once() {
            log::error!("final flush failed: {err}");
        }

        let stats = self.endpoint.stats();
        log::info!(
            "done: {} packets sent, {} received, {} messages delivered, {} dropped by simulation",
            stats.packets_sent,
            stats.packets_received,
            stats.messages_delivered,
            self.endpoint.transport().dropped()
        );
    }

    pub fn tick_once(&mut self) -> Result<()> {
        for message in self.endpoint.receive_messages()? {
            match message.downcast_ref::<ChatMessage>() {
                Some(chat) => log::info!("[{}#{}] {}", chat.from, message.uid(), chat.text),
                None => log::warn!("unexpected message type {}", message.type_id()),
            }
        }

        if !self.is_done() {
            let chat = ChatMessage {
                from: self.config.name.clone(),
                text: format!("hello #{}", self.sent),
            };
            match self.endpoint.queue(&chat, self.config.reliability) {
                Ok(_) => self.sent += 1,
                // retried next tick once acks free a slot
                Err(err @ Error::BacklogFull(_)) => log::warn!("greeting held back: {err}"),
                Err(err) => return Err(err),
            }
        }

        let packets = self.endpoint.send_queued()?;
        log::debug!(
            "{packets} packets out, {} reliable messages awaiting ack",
            self.endpoint.pending_reliable()
        );

        Ok(())
    }

    fn is_done(&self) -> bool {
        self.config.count.is_some_and(|count| self.sent >= count)
    }
}
