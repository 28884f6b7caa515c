//! The `persistence` module backs durable queues with an embedded store.
//!
//! Messages published to a durable queue are written here before the
//! publish returns, and removed once the delivery is acknowledged or
//! dead-lettered. On startup, any messages still in the store are reloaded
//! into their queue so a broker restart never drops unsettled work.
//!
//! `sled` is used as the embedded key-value store, one tree per queue.

pub mod sled_store;

pub use sled_store::QueueStore;

#[cfg(test)]
mod tests;
