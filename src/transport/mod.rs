//! The `transport` module is responsible for point-to-point RPC between the
//! gateway and its backends.
//!
//! It defines the wire envelopes exchanged over the socket, the
//! [`TransportClient`] that issues a command and awaits exactly one reply,
//! and the [`RpcServer`] a backend runs to answer pattern-matched commands.
//! Framing is WebSocket text carrying JSON.

pub mod client;
pub mod message;
pub mod server;

pub use client::TransportClient;
pub use message::{CommandEnvelope, Reply};
pub use server::RpcServer;
