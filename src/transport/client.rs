use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio_tungstenite::connect_async;
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

use crate::transport::message::{CommandEnvelope, Reply};
use crate::utils::error::TransportError;

/// Point-to-point RPC client for one named backend endpoint.
///
/// Each call opens a fresh connection, sends one command envelope and
/// resolves exactly one reply. Timing out abandons the call and drops the
/// socket, so a late reply has nowhere to land; the id check additionally
/// rejects a reply that correlates to some other call.
#[derive(Debug, Clone)]
pub struct TransportClient {
    addr: String,
    timeout: Duration,
}

impl TransportClient {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Sends `pattern` with `payload` and awaits the reply.
    ///
    /// Never hangs past the configured timeout. Connection refusal, timeout
    /// and malformed replies come back as distinct error kinds; none are
    /// retried here.
    pub async fn call(&self, pattern: &str, payload: Value) -> Result<Value, TransportError> {
        match tokio::time::timeout(self.timeout, self.call_inner(pattern, payload)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                addr: self.addr.clone(),
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        }
    }

    async fn call_inner(&self, pattern: &str, payload: Value) -> Result<Value, TransportError> {
        let url = format!("ws://{}", self.addr);
        let (mut ws, _) = connect_async(url.as_str())
            .await
            .map_err(|e| TransportError::Connection {
                addr: self.addr.clone(),
                source: e,
            })?;

        let envelope = CommandEnvelope {
            id: Uuid::new_v4().to_string(),
            pattern: pattern.to_string(),
            payload,
        };
        let text = serde_json::to_string(&envelope).map_err(|e| TransportError::Encode {
            pattern: pattern.to_string(),
            source: e,
        })?;
        ws.send(WsMessage::text(text))
            .await
            .map_err(|e| TransportError::Connection {
                addr: self.addr.clone(),
                source: e,
            })?;

        while let Some(frame) = ws.next().await {
            let frame = frame.map_err(|e| TransportError::Connection {
                addr: self.addr.clone(),
                source: e,
            })?;
            match frame {
                WsMessage::Text(text) => {
                    let reply: Reply = serde_json::from_str(text.as_str()).map_err(|e| {
                        TransportError::MalformedReply {
                            addr: self.addr.clone(),
                            detail: e.to_string(),
                        }
                    })?;
                    if reply.id != envelope.id {
                        return Err(TransportError::MalformedReply {
                            addr: self.addr.clone(),
                            detail: format!(
                                "reply id {} does not match call id {}",
                                reply.id, envelope.id
                            ),
                        });
                    }
                    return match (reply.value, reply.error) {
                        (Some(value), None) => Ok(value),
                        (None, Some(reason)) => Err(TransportError::Rejected {
                            addr: self.addr.clone(),
                            pattern: pattern.to_string(),
                            reason,
                        }),
                        _ => Err(TransportError::MalformedReply {
                            addr: self.addr.clone(),
                            detail: "reply carries neither value nor error".to_string(),
                        }),
                    };
                }
                WsMessage::Ping(_) | WsMessage::Pong(_) => continue,
                WsMessage::Close(_) => break,
                _ => {
                    return Err(TransportError::MalformedReply {
                        addr: self.addr.clone(),
                        detail: "unexpected non-text frame".to_string(),
                    });
                }
            }
        }

        // Zero replies before the peer hung up is a protocol violation.
        Err(TransportError::ConnectionClosed {
            addr: self.addr.clone(),
        })
    }
}
