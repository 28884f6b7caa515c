use serde::{Deserialize, Serialize};

/// A message enqueued on a named queue.
///
/// The payload is an opaque serialized record; the broker stores and delivers
/// it byte-for-byte and never looks inside. The routing key names the event
/// the message represents (e.g. `invoice_created`) so a consumer can tell
/// apart message kinds sharing one queue.
///
/// # Fields
///
/// - `queue` - The queue this message was published to.
/// - `routing_key` - The event name attached by the producer.
/// - `payload` - The serialized record, usually a JSON-encoded string.
/// - `published_at` - Unix timestamp in milliseconds at publish time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueMessage {
    pub queue: String,
    pub routing_key: String,
    pub payload: String,
    pub published_at: i64,
}
