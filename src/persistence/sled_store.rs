use sled::Db;
use tracing::warn;

use crate::broker::message::QueueMessage;
use crate::utils::error::PublishError;

/// Durable backing store for queues.
///
/// Each queue gets its own sled tree; entries are keyed by a db-wide
/// monotonic sequence in big-endian form so iteration yields messages in
/// publish order. An entry lives from publish until ack (or dead-letter),
/// which is exactly the window in which a crash must not lose the message.
#[derive(Debug, Clone)]
pub struct QueueStore {
    db: Db,
}

impl QueueStore {
    pub fn open(path: &str) -> Result<Self, sled::Error> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Appends a message to the queue's tree and returns its sequence.
    pub fn append(&self, queue: &str, message: &QueueMessage) -> Result<u64, PublishError> {
        let seq = self.db.generate_id()?;
        let serialized = serde_json::to_vec(message)?;
        let tree = self.db.open_tree(queue)?;
        tree.insert(seq.to_be_bytes(), serialized)?;
        Ok(seq)
    }

    /// Removes a settled message. Removing a sequence that is already gone
    /// has no effect.
    pub fn remove(&self, queue: &str, seq: u64) -> Result<(), sled::Error> {
        let tree = self.db.open_tree(queue)?;
        tree.remove(seq.to_be_bytes())?;
        Ok(())
    }

    /// Loads all unsettled messages for a queue, in publish order.
    ///
    /// Entries that fail to decode are skipped with a warning rather than
    /// poisoning the whole queue.
    pub fn pending(&self, queue: &str) -> Result<Vec<(u64, QueueMessage)>, sled::Error> {
        let tree = self.db.open_tree(queue)?;
        let mut messages = Vec::new();
        for entry in tree.iter() {
            let (key, value) = entry?;
            let key_bytes: [u8; 8] = match key.as_ref().try_into() {
                Ok(bytes) => bytes,
                Err(_) => {
                    warn!(queue, "skipping store entry with malformed key");
                    continue;
                }
            };
            let seq = u64::from_be_bytes(key_bytes);
            match serde_json::from_slice::<QueueMessage>(&value) {
                Ok(message) => messages.push((seq, message)),
                Err(e) => warn!(queue, seq, error = %e, "skipping undecodable store entry"),
            }
        }
        Ok(messages)
    }
}
