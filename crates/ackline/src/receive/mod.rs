mod ordered;
mod receiver;
mod unordered;

pub use ordered::OrderedDelivery;
pub use receiver::MessageReceiver;
pub use unordered::UnorderedDelivery;

use crate::message::ReceivedMessage;

/// Decides when decoded, de-duplicated messages are released to the caller.
pub trait DeliveryPolicy {
    fn on_message_received(&mut self, message: ReceivedMessage);

    fn take_received(&mut self) -> Vec<ReceivedMessage>;
}
