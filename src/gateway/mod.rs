//! The `gateway` module exposes the entry points a front-facing HTTP layer
//! would call.
//!
//! It owns the wired-up router and invoice workflow; construction happens
//! explicitly once at process start, collaborators passed in as arguments.

use serde_json::Value;

use crate::invoice::workflow::{InvoiceReceipt, InvoiceWorkflow};
use crate::rpc::router::{RouteCall, RpcRouter};
use crate::utils::error::{PublishError, TransportError};

/// Logical backend names the greeting fans out to, in declared order.
pub const SERVICE_A: &str = "service-a";
pub const SERVICE_B: &str = "service-b";

pub struct Gateway {
    router: RpcRouter,
    workflow: InvoiceWorkflow,
}

impl Gateway {
    pub fn new(router: RpcRouter, workflow: InvoiceWorkflow) -> Self {
        Self { router, workflow }
    }

    /// Fans the greeting out to both hello backends and joins their replies
    /// in declared order, regardless of which backend answers first.
    pub async fn hello(&self) -> Result<String, TransportError> {
        let calls = [
            RouteCall::new(SERVICE_A, "helloA", Value::String(String::new())),
            RouteCall::new(SERVICE_B, "helloB", Value::String(String::new())),
        ];
        let replies = self.router.dispatch(&calls).await?;
        let parts: Vec<&str> = replies
            .iter()
            .map(|value| value.as_str().unwrap_or_default())
            .collect();
        Ok(parts.join(" <br/> "))
    }

    /// Generates and publishes an invoice for `client_id`. Returns as soon
    /// as the message is queued, independent of eventual processing.
    pub fn generate_invoice(&self, client_id: &str) -> Result<InvoiceReceipt, PublishError> {
        self.workflow.generate_invoice(client_id)
    }
}
