use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tracing::{error, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::transport::message::{CommandEnvelope, Reply};

type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, String>> + Send>>;
type Handler = Arc<dyn Fn(Value) -> HandlerFuture + Send + Sync>;

/// A backend endpoint answering pattern-matched commands.
///
/// Handlers are registered once at startup into a plain map; dispatch is a
/// direct lookup on the envelope's pattern string, no reflection. A command
/// always gets exactly one reply: an unknown pattern or a handler failure is
/// answered with an error reply rather than silence.
#[derive(Default)]
pub struct RpcServer {
    handlers: HashMap<String, Handler>,
}

impl RpcServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `pattern`, replacing any previous handler for
    /// the same pattern.
    pub fn register<F, Fut>(&mut self, pattern: &str, handler: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, String>> + Send + 'static,
    {
        self.handlers.insert(
            pattern.to_string(),
            Arc::new(move |payload| {
                let fut: HandlerFuture = Box::pin(handler(payload));
                fut
            }),
        );
    }

    /// Accepts connections on `addr` and serves commands until the listener
    /// fails.
    pub async fn serve(self, addr: &str) -> std::io::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        info!(addr, "rpc backend listening");
        let handlers = Arc::new(self.handlers);

        loop {
            let (stream, peer) = listener.accept().await?;
            let handlers = handlers.clone();

            tokio::spawn(async move {
                let ws_stream = match accept_async(stream).await {
                    Ok(ws) => ws,
                    Err(e) => {
                        warn!(%peer, error = %e, "websocket handshake failed");
                        return;
                    }
                };
                let (mut ws_sender, mut ws_receiver) = ws_stream.split();

                while let Some(Ok(msg)) = ws_receiver.next().await {
                    let WsMessage::Text(text) = msg else {
                        continue;
                    };
                    let envelope = match serde_json::from_str::<CommandEnvelope>(text.as_str()) {
                        Ok(envelope) => envelope,
                        Err(e) => {
                            warn!(%peer, error = %e, "invalid command envelope");
                            continue;
                        }
                    };

                    let reply = match handlers.get(&envelope.pattern) {
                        Some(handler) => match handler(envelope.payload.clone()).await {
                            Ok(value) => Reply::ok(&envelope.id, value),
                            Err(reason) => Reply::err(&envelope.id, reason),
                        },
                        None => Reply::err(
                            &envelope.id,
                            format!("no handler for pattern \"{}\"", envelope.pattern),
                        ),
                    };

                    let text = match serde_json::to_string(&reply) {
                        Ok(json) => json,
                        Err(e) => {
                            error!(%peer, error = %e, "failed to serialize reply");
                            continue;
                        }
                    };
                    if let Err(e) = ws_sender.send(WsMessage::text(text)).await {
                        warn!(%peer, error = %e, "failed to send reply");
                        break;
                    }
                }
            });
        }
    }
}
