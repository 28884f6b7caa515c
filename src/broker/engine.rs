use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::broker::delivery::Delivery;
use crate::broker::message::QueueMessage;
use crate::broker::queue::{ConsumerId, OutstandingDelivery, PendingMessage, Queue};
use crate::persistence::QueueStore;
use crate::queue::consumer::QueueConsumer;
use crate::utils::error::{AckError, ConsumeError, PublishError};

/// Suffix of the dead-letter companion a queue's rejected messages land on.
pub const DEAD_LETTER_SUFFIX: &str = ".dead-letter";

/// The broker core: named queues, their consumers, and the delivery-tag
/// bookkeeping. Not used directly; wrap it in a [`BrokerChannel`].
#[derive(Debug, Default)]
pub struct Broker {
    queues: HashMap<String, Queue>,
    store: Option<QueueStore>,
    mem_seq: u64,
}

impl Broker {
    /// Creates a broker with no backing store. Durable queues still get
    /// at-least-once delivery within the process, but do not survive a
    /// restart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a broker whose durable queues are backed by `store`.
    pub fn with_store(store: QueueStore) -> Self {
        Self {
            queues: HashMap::new(),
            store: Some(store),
            mem_seq: 0,
        }
    }

    fn declare_queue(&mut self, name: &str, durable: bool) -> Result<(), PublishError> {
        if self.queues.contains_key(name) {
            return Ok(());
        }
        let mut queue = Queue::new(name, durable);
        if durable {
            if let Some(store) = &self.store {
                let recovered = store.pending(name)?;
                if !recovered.is_empty() {
                    info!(queue = name, count = recovered.len(), "recovered unsettled messages");
                }
                for (seq, message) in recovered {
                    // Anything still in the store at startup may already have
                    // been handed out before the crash, so it is flagged as a
                    // redelivery.
                    queue.ready.push_back(PendingMessage {
                        seq,
                        message,
                        redelivered: true,
                    });
                }
            }
        }
        self.queues.insert(name.to_string(), queue);
        Ok(())
    }

    /// Appends a message to its queue, writing durable queues through to the
    /// store first. Returns the assigned sequence.
    fn enqueue(&mut self, message: QueueMessage) -> Result<u64, PublishError> {
        let durable = self
            .queues
            .get(&message.queue)
            .map(|queue| queue.durable)
            .ok_or_else(|| PublishError::UnknownQueue(message.queue.clone()))?;

        let seq = match (&self.store, durable) {
            (Some(store), true) => store.append(&message.queue, &message)?,
            _ => {
                self.mem_seq += 1;
                self.mem_seq
            }
        };

        if let Some(queue) = self.queues.get_mut(&message.queue) {
            queue.ready.push_back(PendingMessage {
                seq,
                message,
                redelivered: false,
            });
        }
        Ok(seq)
    }

    fn settle(&mut self, queue: &str, tag: u64) -> Result<OutstandingDelivery, AckError> {
        let outstanding = self
            .queues
            .get_mut(queue)
            .and_then(|q| q.unacked.remove(&tag))
            .ok_or_else(|| AckError::UnknownDeliveryTag {
                queue: queue.to_string(),
                tag,
            })?;

        let durable = self.queues.get(queue).map(|q| q.durable).unwrap_or(false);
        if durable {
            if let Some(store) = &self.store {
                store.remove(queue, outstanding.pending.seq)?;
            }
        }
        Ok(outstanding)
    }
}

/// Cloneable, interleaving-safe handle to a [`Broker`].
///
/// Producers, consumers and delivery handles all share one channel; every
/// operation takes the single internal lock, so no two operations can
/// corrupt a queue's delivery-tag bookkeeping.
#[derive(Debug, Clone)]
pub struct BrokerChannel {
    inner: Arc<Mutex<Broker>>,
}

impl BrokerChannel {
    pub fn new(broker: Broker) -> Self {
        Self {
            inner: Arc::new(Mutex::new(broker)),
        }
    }

    /// Declares a named queue. Redeclaring an existing queue is a no-op.
    /// Declaring a durable queue against a stored broker reloads its
    /// unsettled messages.
    pub fn declare_queue(&self, name: &str, durable: bool) -> Result<(), PublishError> {
        let mut broker = self.inner.lock().unwrap();
        broker.declare_queue(name, durable)
    }

    /// Queues a message and hands it to a consumer if one is attached.
    /// Returns the broker-assigned sequence once the message is safely
    /// queued; delivery and processing happen after the fact.
    pub fn publish(&self, message: QueueMessage) -> Result<u64, PublishError> {
        let queue_name = message.queue.clone();
        let mut broker = self.inner.lock().unwrap();
        let seq = broker.enqueue(message)?;
        debug!(queue = %queue_name, seq, "message queued");
        self.dispatch_locked(&mut broker, &queue_name);
        Ok(seq)
    }

    /// Attaches a new consumer to a queue and starts feeding it.
    pub fn consume(&self, queue: &str) -> Result<QueueConsumer, ConsumeError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id: ConsumerId = format!("consumer-{}", Uuid::new_v4());

        let mut broker = self.inner.lock().unwrap();
        broker
            .queues
            .get_mut(queue)
            .ok_or_else(|| ConsumeError::UnknownQueue(queue.to_string()))?
            .add_consumer(id.clone(), sender);
        info!(queue, consumer = %id, "consumer attached");
        self.dispatch_locked(&mut broker, queue);
        drop(broker);

        Ok(QueueConsumer::new(
            id,
            queue.to_string(),
            self.clone(),
            receiver,
        ))
    }

    /// Detaches a consumer. Its unsettled deliveries go back to the front of
    /// the queue, flagged redelivered, and are offered to the remaining
    /// consumers.
    pub fn cancel(&self, queue: &str, consumer: &ConsumerId) {
        let mut broker = self.inner.lock().unwrap();
        if let Some(q) = broker.queues.get_mut(queue) {
            let requeued = q.remove_consumer(consumer);
            if !requeued.is_empty() {
                warn!(queue, consumer = %consumer, count = requeued.len(), "requeueing unsettled deliveries");
            }
            for pending in requeued.into_iter().rev() {
                q.ready.push_front(pending);
            }
        }
        self.dispatch_locked(&mut broker, queue);
    }

    /// Acknowledges a delivery: the terminal success state. The tag is
    /// forgotten and the message leaves the durable store.
    pub fn ack(&self, queue: &str, tag: u64) -> Result<(), AckError> {
        let mut broker = self.inner.lock().unwrap();
        broker.settle(queue, tag)?;
        debug!(queue, tag, "delivery acked");
        Ok(())
    }

    /// Negatively acknowledges a delivery. With `requeue` the message goes
    /// back to the front of its queue as a redelivery; without, it moves to
    /// the queue's `<name>.dead-letter` companion, payload untouched.
    pub fn nack(&self, queue: &str, tag: u64, requeue: bool) -> Result<(), AckError> {
        let mut broker = self.inner.lock().unwrap();
        let outstanding = broker.settle(queue, tag)?;
        let mut pending = outstanding.pending;

        if requeue {
            warn!(queue, tag, "delivery nacked, requeueing");
            pending.redelivered = true;
            if let Some(q) = broker.queues.get_mut(queue) {
                q.ready.push_front(pending);
            }
            self.dispatch_locked(&mut broker, queue);
            return Ok(());
        }

        let dead_letter = format!("{queue}{DEAD_LETTER_SUFFIX}");
        warn!(queue, tag, dead_letter = %dead_letter, "delivery nacked, dead-lettering");
        let durable = broker.queues.get(queue).map(|q| q.durable).unwrap_or(false);
        let mut message = pending.message;
        message.queue = dead_letter.clone();

        // Store failures past this point would strand the message, so they
        // surface to the caller.
        broker.declare_queue(&dead_letter, durable)?;
        broker.enqueue(message)?;
        self.dispatch_locked(&mut broker, &dead_letter);
        Ok(())
    }

    /// Current (ready, unacked) depths of a queue, for operational checks.
    pub fn queue_depth(&self, queue: &str) -> Option<(usize, usize)> {
        let broker = self.inner.lock().unwrap();
        broker
            .queues
            .get(queue)
            .map(|q| (q.ready.len(), q.unacked.len()))
    }

    /// Drains a queue's ready messages into its consumers, one delivery per
    /// message. Must be called with the lock already held; `broker` is the
    /// guarded state.
    fn dispatch_locked(&self, broker: &mut Broker, queue: &str) {
        loop {
            let Some(q) = broker.queues.get_mut(queue) else {
                return;
            };
            if q.ready.is_empty() {
                return;
            }
            let Some((consumer_id, sender)) = q.next_consumer() else {
                return;
            };
            let Some(pending) = q.ready.pop_front() else {
                return;
            };

            let tag = q.next_tag();
            let delivery = Delivery {
                queue: queue.to_string(),
                delivery_tag: tag,
                redelivered: pending.redelivered,
                message: pending.message.clone(),
                channel: self.clone(),
            };

            if sender.send(delivery).is_ok() {
                debug!(queue, tag, consumer = %consumer_id, "delivery dispatched");
                q.unacked.insert(
                    tag,
                    OutstandingDelivery {
                        consumer: consumer_id,
                        pending,
                    },
                );
            } else {
                // The consumer's channel is gone: drop it, put this message
                // and everything it still held back at the front, go again.
                warn!(queue, consumer = %consumer_id, "consumer channel closed, pruning");
                q.ready.push_front(pending);
                let requeued = q.remove_consumer(&consumer_id);
                for orphaned in requeued.into_iter().rev() {
                    q.ready.push_front(orphaned);
                }
            }
        }
    }
}
