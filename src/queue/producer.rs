use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use crate::broker::engine::BrokerChannel;
use crate::broker::message::QueueMessage;
use crate::utils::error::PublishError;

/// Broker confirmation of a publish, for callers opting into the stronger
/// contract. Carries the sequence the broker assigned to the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishConfirm {
    pub sequence: u64,
}

/// Producer side of the work queue.
///
/// Publishing is fire-and-forget: once the broker has queued (and, for a
/// durable queue, stored) the message, the producer is done. It never learns
/// whether a consumer processed the message, by design.
#[derive(Debug, Clone)]
pub struct QueueProducer {
    channel: BrokerChannel,
}

impl QueueProducer {
    pub fn new(channel: BrokerChannel) -> Self {
        Self { channel }
    }

    /// Serializes `record` and publishes it to `queue` under `routing_key`.
    ///
    /// An error here means the message was never queued and the caller
    /// should treat the operation that produced the record as failed.
    pub fn publish<T: Serialize>(
        &self,
        queue: &str,
        routing_key: &str,
        record: &T,
    ) -> Result<(), PublishError> {
        self.publish_confirmed(queue, routing_key, record)?;
        Ok(())
    }

    /// Like [`QueueProducer::publish`], but returns the broker's confirm so
    /// the caller can correlate the message later.
    pub fn publish_confirmed<T: Serialize>(
        &self,
        queue: &str,
        routing_key: &str,
        record: &T,
    ) -> Result<PublishConfirm, PublishError> {
        let payload = serde_json::to_string(record)?;
        let message = QueueMessage {
            queue: queue.to_string(),
            routing_key: routing_key.to_string(),
            payload,
            published_at: Utc::now().timestamp_millis(),
        };
        let sequence = self.channel.publish(message)?;
        debug!(queue, routing_key, sequence, "record published");
        Ok(PublishConfirm { sequence })
    }
}
