use crate::broker::engine::BrokerChannel;
use crate::broker::message::QueueMessage;
use crate::utils::error::AckError;

/// One delivery attempt of a queue message, handed to a consumer.
///
/// Carries everything needed to settle the attempt: the channel reference
/// back to the broker, the broker-assigned delivery tag, and the redelivered
/// flag telling the consumer this exact message may have been seen before.
/// The broker keeps the message outstanding until [`Delivery::ack`] or
/// [`Delivery::nack`] is called with this tag.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub queue: String,
    pub delivery_tag: u64,
    pub redelivered: bool,
    pub message: QueueMessage,
    pub(crate) channel: BrokerChannel,
}

impl Delivery {
    /// Acknowledges this delivery: terminal success. The broker drops the
    /// message from its durable store and forgets the tag.
    pub fn ack(&self) -> Result<(), AckError> {
        self.channel.ack(&self.queue, self.delivery_tag)
    }

    /// Negatively acknowledges this delivery. With `requeue` the message
    /// goes back to the front of the queue, flagged as redelivered;
    /// without, it is moved to the queue's dead-letter companion.
    pub fn nack(&self, requeue: bool) -> Result<(), AckError> {
        self.channel.nack(&self.queue, self.delivery_tag, requeue)
    }
}
