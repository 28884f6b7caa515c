//! The `rpc` module routes logical commands to named backends.
//!
//! The router holds a static map from backend name to a live
//! [`TransportClient`](crate::transport::TransportClient), fans a dispatch
//! out to every named backend concurrently, and joins the replies in the
//! order the request declared them, so output is deterministic regardless of
//! backend latency.

pub mod router;

pub use router::{RouteCall, RpcRouter};
