use std::future::Future;

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::warn;

use crate::broker::delivery::Delivery;
use crate::broker::engine::BrokerChannel;
use crate::broker::message::QueueMessage;
use crate::broker::queue::ConsumerId;
use crate::utils::error::ProcessingError;

/// Consumer side of the work queue, bound to exactly one named queue.
///
/// Deliveries arrive one at a time; each goes through
/// `DELIVERED -> PROCESSING -> {ACKED | NACKED}`. There is no auto-ack: the
/// broker keeps a delivery outstanding until the callback has actually
/// finished, so a consumer that dies mid-processing leaves the message
/// eligible for redelivery to another consumer.
#[derive(Debug)]
pub struct QueueConsumer {
    id: ConsumerId,
    queue: String,
    channel: BrokerChannel,
    deliveries: UnboundedReceiver<Delivery>,
}

impl QueueConsumer {
    pub(crate) fn new(
        id: ConsumerId,
        queue: String,
        channel: BrokerChannel,
        deliveries: UnboundedReceiver<Delivery>,
    ) -> Self {
        Self {
            id,
            queue,
            channel,
            deliveries,
        }
    }

    pub fn id(&self) -> &ConsumerId {
        &self.id
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Waits for the next delivery. The delivery stays outstanding until the
    /// caller settles it through the handle.
    pub async fn next(&mut self) -> Option<Delivery> {
        self.deliveries.recv().await
    }

    /// Takes a delivery if one is already waiting, without suspending.
    pub fn try_next(&mut self) -> Option<Delivery> {
        self.deliveries.try_recv().ok()
    }

    /// Detaches from the queue. Unsettled deliveries this consumer still
    /// holds are requeued for the remaining consumers.
    pub fn close(self) {
        self.channel.cancel(&self.queue, &self.id);
    }

    /// Runs the manual-acknowledgment processing loop until the broker drops
    /// this consumer.
    ///
    /// The callback gets the message and the redelivered flag. On `Ok` the
    /// delivery is acked; on `Err` it is nacked without requeue, which moves
    /// the message to the queue's dead-letter companion instead of looping
    /// it back forever. Settle failures are logged, never propagated: a
    /// processing outcome must not crash the loop.
    pub async fn run<F, Fut>(mut self, handler: F)
    where
        F: Fn(QueueMessage, bool) -> Fut,
        Fut: Future<Output = Result<(), ProcessingError>>,
    {
        while let Some(delivery) = self.deliveries.recv().await {
            let outcome = handler(delivery.message.clone(), delivery.redelivered).await;
            match outcome {
                Ok(()) => {
                    if let Err(e) = delivery.ack() {
                        warn!(queue = %delivery.queue, tag = delivery.delivery_tag, error = %e, "ack failed");
                    }
                }
                Err(failure) => {
                    warn!(queue = %delivery.queue, tag = delivery.delivery_tag, error = %failure, "processing failed, dead-lettering");
                    if let Err(e) = delivery.nack(false) {
                        warn!(queue = %delivery.queue, tag = delivery.delivery_tag, error = %e, "nack failed");
                    }
                }
            }
        }
    }
}
