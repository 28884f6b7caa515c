use std::collections::{HashMap, VecDeque};

use tokio::sync::mpsc::UnboundedSender;

use crate::broker::delivery::Delivery;
use crate::broker::message::QueueMessage;

pub type ConsumerId = String;

/// A message sitting in a queue, waiting for a consumer.
///
/// `seq` is the durable-store sequence backing the message (for a
/// non-durable queue it is an in-memory counter). `redelivered` is set once
/// the message has been handed to a consumer and come back unsettled.
#[derive(Debug, Clone)]
pub struct PendingMessage {
    pub seq: u64,
    pub message: QueueMessage,
    pub redelivered: bool,
}

/// Bookkeeping for a delivery that has been handed out but not yet settled.
/// Keyed by delivery tag in [`Queue::unacked`].
#[derive(Debug, Clone)]
pub struct OutstandingDelivery {
    pub consumer: ConsumerId,
    pub pending: PendingMessage,
}

/// State of one named queue inside the broker.
///
/// Ready messages wait in publish order; consumers are served round-robin;
/// each delivery gets a queue-scoped tag that stays in `unacked` until the
/// consumer settles it. A delivery tag is never reused within a queue, so a
/// late ack for an already-settled tag is detectable.
#[derive(Debug)]
pub struct Queue {
    pub name: String,
    pub durable: bool,
    pub ready: VecDeque<PendingMessage>,
    pub consumers: Vec<(ConsumerId, UnboundedSender<Delivery>)>,
    pub unacked: HashMap<u64, OutstandingDelivery>,
    tag_counter: u64,
    rr_cursor: usize,
}

impl Queue {
    pub fn new(name: &str, durable: bool) -> Self {
        Self {
            name: name.to_string(),
            durable,
            ready: VecDeque::new(),
            consumers: Vec::new(),
            unacked: HashMap::new(),
            tag_counter: 0,
            rr_cursor: 0,
        }
    }

    /// Allocates the next delivery tag for this queue. Tags are never reused
    /// within a queue.
    pub fn next_tag(&mut self) -> u64 {
        self.tag_counter += 1;
        self.tag_counter
    }

    pub fn add_consumer(&mut self, id: ConsumerId, sender: UnboundedSender<Delivery>) {
        self.consumers.push((id, sender));
    }

    /// Removes a consumer and returns its unsettled deliveries, flagged as
    /// redelivered, so the caller can put them back at the front of the
    /// queue.
    pub fn remove_consumer(&mut self, id: &ConsumerId) -> Vec<PendingMessage> {
        self.consumers.retain(|(consumer_id, _)| consumer_id != id);

        let orphaned_tags: Vec<u64> = self
            .unacked
            .iter()
            .filter(|(_, outstanding)| &outstanding.consumer == id)
            .map(|(tag, _)| *tag)
            .collect();

        let mut requeued = Vec::new();
        for tag in orphaned_tags {
            if let Some(outstanding) = self.unacked.remove(&tag) {
                let mut pending = outstanding.pending;
                pending.redelivered = true;
                requeued.push(pending);
            }
        }
        requeued
    }

    /// Picks the next consumer round-robin. Consumers whose delivery channel
    /// has closed are not candidates; the engine prunes them on failed sends.
    pub fn next_consumer(&mut self) -> Option<(ConsumerId, UnboundedSender<Delivery>)> {
        if self.consumers.is_empty() {
            return None;
        }
        let index = self.rr_cursor % self.consumers.len();
        self.rr_cursor = self.rr_cursor.wrapping_add(1);
        self.consumers
            .get(index)
            .map(|(id, sender)| (id.clone(), sender.clone()))
    }
}
