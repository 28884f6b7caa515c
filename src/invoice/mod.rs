//! The `invoice` module is the business workflow riding on the work queue.
//!
//! The producer side generates an invoice record and publishes it under the
//! `invoice_created` routing key; the consumer side processes the record
//! (simulated variable-latency work standing in for rendering and email
//! dispatch) before the delivery is acknowledged. The caller gets its
//! receipt as soon as the publish succeeds; fulfillment is eventual and
//! decoupled by design.

pub mod record;
pub mod workflow;

pub use record::Invoice;
pub use workflow::{
    INVOICE_CREATED, INVOICE_QUEUE, InvoiceReceipt, InvoiceWorkflow, process_invoice,
};
