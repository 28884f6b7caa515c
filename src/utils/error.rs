//! The `error` module defines the error types used within the `relayq`
//! application.
//!
//! Each messaging layer has its own error enum so callers can tell a
//! transport-level failure apart from a broker-level one. None of these
//! errors trigger retries on their own; retry policy belongs to the caller.

use thiserror::Error;

/// Failures of a single point-to-point RPC call.
///
/// Connection refusal, timeout and malformed replies are distinct kinds so
/// the caller can decide what is worth retrying. The transport itself never
/// retries.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to backend {addr}: {source}")]
    Connection {
        addr: String,
        #[source]
        source: tungstenite::Error,
    },

    #[error("no reply from backend {addr} within {timeout_ms}ms")]
    Timeout { addr: String, timeout_ms: u64 },

    #[error("connection to backend {addr} closed before a reply arrived")]
    ConnectionClosed { addr: String },

    #[error("malformed reply from backend {addr}: {detail}")]
    MalformedReply { addr: String, detail: String },

    #[error("failed to encode command {pattern}: {source}")]
    Encode {
        pattern: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backend answered, but with an application-level error reply.
    #[error("backend {addr} rejected {pattern}: {reason}")]
    Rejected {
        addr: String,
        pattern: String,
        reason: String,
    },

    /// A dispatch named a backend the router has no client for.
    #[error("no backend registered under name \"{0}\"")]
    UnknownBackend(String),
}

/// Failures surfaced synchronously to a publisher.
///
/// Once `publish` returns `Ok`, the message is queued (and stored, for a
/// durable queue); whether it is ever processed is not the producer's
/// concern.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("queue \"{0}\" has not been declared")]
    UnknownQueue(String),

    #[error("failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("durable store rejected message: {0}")]
    Store(#[from] sled::Error),
}

/// Failure to attach a consumer to a queue.
#[derive(Debug, Error)]
pub enum ConsumeError {
    #[error("queue \"{0}\" has not been declared")]
    UnknownQueue(String),
}

/// Failures when settling a delivery.
///
/// Settling a delivery tag that is not outstanding (acked twice, nacked
/// after ack, or simply unknown) is a defined error, never a panic.
#[derive(Debug, Error)]
pub enum AckError {
    #[error("delivery tag {tag} on queue \"{queue}\" is not awaiting acknowledgment")]
    UnknownDeliveryTag { queue: String, tag: u64 },

    #[error("durable store failed while settling delivery: {0}")]
    Store(#[from] sled::Error),

    #[error("failed to move delivery to the dead-letter queue: {0}")]
    DeadLetter(#[from] PublishError),
}

/// Error returned by a consumer processing callback.
///
/// The consumer run loop maps this to a nack; it never crosses the message
/// boundary into the broker's state machine.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ProcessingError(pub String);
