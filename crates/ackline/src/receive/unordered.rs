use super::DeliveryPolicy;
use crate::message::ReceivedMessage;

/// Releases messages in the order they arrived.
#[derive(Debug, Default)]
pub struct UnorderedDelivery {
    received: Vec<ReceivedMessage>,
}

impl DeliveryPolicy for UnorderedDelivery {
    fn on_message_received(&mut self, message: ReceivedMessage) {
        self.received.push(message);
    }

    fn take_received(&mut self) -> Vec<ReceivedMessage> {
        std::mem::take(&mut self.received)
    }
}
