//! The `queue` module holds the producer and consumer sides of the durable
//! work queue.
//!
//! The producer serializes a record and publishes it fire-and-forget; the
//! consumer receives deliveries one at a time and settles each one with an
//! explicit ack or nack once its processing callback resolves. The broker in
//! between guarantees at-least-once delivery, so a consumer that dies
//! mid-processing leaves its message eligible for redelivery.

pub mod consumer;
pub mod producer;

pub use consumer::QueueConsumer;
pub use producer::{PublishConfirm, QueueProducer};
