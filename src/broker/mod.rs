//! The `broker` module implements the in-process durable queue broker.
//!
//! The broker owns message durability and the delivery-tag lifecycle: a
//! published message is stored (for durable queues), handed to at most one
//! consumer at a time, and stays outstanding until that consumer explicitly
//! acknowledges or negatively-acknowledges it. Unsettled deliveries are
//! requeued when their consumer goes away, which is what makes delivery
//! at-least-once rather than at-most-once.
//!
//! All bookkeeping lives behind a single lock inside [`BrokerChannel`], the
//! cloneable handle shared by producers, consumers and delivery handles.

pub mod delivery;
pub mod engine;
pub mod message;
pub mod queue;

pub use delivery::Delivery;
pub use engine::{Broker, BrokerChannel, DEAD_LETTER_SUFFIX};
pub use message::QueueMessage;

#[cfg(test)]
mod tests;
