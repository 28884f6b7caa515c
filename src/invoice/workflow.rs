use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::broker::message::QueueMessage;
use crate::invoice::record::Invoice;
use crate::queue::producer::QueueProducer;
use crate::utils::error::{ProcessingError, PublishError};

/// Durable queue invoice events are published to.
pub const INVOICE_QUEUE: &str = "invoices";

/// Routing key of the invoice-created event.
pub const INVOICE_CREATED: &str = "invoice_created";

/// What the invoice-generation caller gets back: a user-facing note and the
/// invoice id. The amount stays internal to the queued record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceReceipt {
    pub message: String,
    pub invoice_id: String,
}

/// Producer side of the invoice workflow.
#[derive(Debug, Clone)]
pub struct InvoiceWorkflow {
    producer: QueueProducer,
}

impl InvoiceWorkflow {
    pub fn new(producer: QueueProducer) -> Self {
        Self { producer }
    }

    /// Generates an invoice for `client_id`, publishes it, and returns the
    /// receipt as soon as the publish succeeds.
    ///
    /// Whether and when the consumer processes the invoice is not this
    /// caller's concern; fulfillment is eventual. A publish error means the
    /// invoice was never queued and generation must be treated as failed.
    pub fn generate_invoice(&self, client_id: &str) -> Result<InvoiceReceipt, PublishError> {
        let invoice = Invoice::generate(client_id);
        info!(invoice_id = %invoice.invoice_id, client_id, "publishing invoice");
        self.producer
            .publish(INVOICE_QUEUE, INVOICE_CREATED, &invoice)?;
        Ok(InvoiceReceipt {
            message: "Your invoice will be sent by email once it is ready".to_string(),
            invoice_id: invoice.invoice_id,
        })
    }
}

/// Consumer-side processing callback for `invoice_created` events.
///
/// Sleeps a uniform random delay up to `max_delay` to stand in for the real
/// downstream work (rendering, email dispatch); this is why manual ack
/// exists: the delivery must stay outstanding until the work truly
/// completes. An undecodable payload is a processing failure, which the
/// consumer loop turns into a dead-letter nack.
pub async fn process_invoice(
    message: QueueMessage,
    redelivered: bool,
    max_delay: Duration,
) -> Result<(), ProcessingError> {
    let invoice: Invoice = serde_json::from_str(&message.payload)
        .map_err(|e| ProcessingError(format!("undecodable invoice payload: {e}")))?;

    let delay_ms = rand::rng().random_range(0..=max_delay.as_millis() as u64);
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;

    info!(
        invoice_id = %invoice.invoice_id,
        client_id = %invoice.client_id,
        amount = invoice.amount,
        created_at = %invoice.created_at,
        redelivered,
        "invoice processed, email dispatched"
    );
    Ok(())
}
