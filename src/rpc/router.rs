use std::collections::HashMap;

use futures::future::join_all;
use serde_json::Value;

use crate::transport::client::TransportClient;
use crate::utils::error::TransportError;

/// One backend call within a dispatch: which named backend to hit, the
/// pattern to invoke and its payload.
#[derive(Debug, Clone)]
pub struct RouteCall {
    pub backend: String,
    pub pattern: String,
    pub payload: Value,
}

impl RouteCall {
    pub fn new(backend: &str, pattern: &str, payload: Value) -> Self {
        Self {
            backend: backend.to_string(),
            pattern: pattern.to_string(),
            payload,
        }
    }
}

/// Maps logical backend names to transport clients and fans dispatches out
/// to them.
///
/// The mapping is fixed at construction time for the life of the process;
/// there is no runtime re-registration.
#[derive(Debug, Default)]
pub struct RpcRouter {
    backends: HashMap<String, TransportClient>,
}

impl RpcRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a client under a logical backend name. Wiring happens once
    /// at process start.
    pub fn register(&mut self, name: &str, client: TransportClient) {
        self.backends.insert(name.to_string(), client);
    }

    /// Issues every call concurrently and joins the replies in the order the
    /// calls were declared, not the order the backends answered.
    ///
    /// Any failing call fails the whole dispatch; there is no partial
    /// result. The error surfaced is the first one in declared order. No
    /// retries happen at this layer.
    pub async fn dispatch(&self, calls: &[RouteCall]) -> Result<Vec<Value>, TransportError> {
        let in_flight = calls.iter().map(|call| async move {
            let client = self
                .backends
                .get(&call.backend)
                .ok_or_else(|| TransportError::UnknownBackend(call.backend.clone()))?;
            client.call(&call.pattern, call.payload.clone()).await
        });

        // join_all preserves input order, which is the ordering contract.
        let replies = join_all(in_flight).await;
        replies.into_iter().collect()
    }
}
