//! # RelayQ
//!
//! `relayq` is a dual-pattern messaging substrate built with Rust. It routes
//! client requests through a gateway to backend workers two ways: synchronous
//! request/reply RPC over a point-to-point transport, and asynchronous
//! publish/consume over a durable, manually-acknowledged work queue.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `transport`: The point-to-point RPC wire layer - command envelopes, the client, and the backend server.
//! - `rpc`: The router that fans a request out to named backends and joins replies in declared order.
//! - `broker`: The in-process durable queue broker - delivery tags, manual acknowledgment, redelivery.
//! - `queue`: The producer and consumer sides of the work queue.
//! - `invoice`: The invoice workflow riding on top of the queue.
//! - `gateway`: The public entry points a front-facing HTTP layer would call.
//! - `config`: Handles loading and managing configuration.
//! - `persistence`: Provides the sled-backed store durable queues survive restarts with.
//! - `utils`: Contains shared utilities, such as error types and logging setup.

pub mod broker;
pub mod config;
pub mod gateway;
pub mod invoice;
pub mod persistence;
pub mod queue;
pub mod rpc;
pub mod transport;
pub mod utils;

#[cfg(test)]
mod tests;
