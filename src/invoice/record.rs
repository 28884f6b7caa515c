use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// An invoice record as published on the queue.
///
/// `invoice_id` and `amount` are assigned exactly once at generation and
/// never recomputed. Wire field names are camelCase (`invoiceId`,
/// `clientId`, `createdAt`) to match the `invoice_created` event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub invoice_id: String,
    pub client_id: String,
    pub amount: u32,
    pub created_at: String,
}

impl Invoice {
    /// Generates a fresh record for `client_id`: a wall-clock-derived
    /// `INV-<unix millis>` id, an amount drawn uniformly from [100, 1099],
    /// and an RFC 3339 creation timestamp.
    pub fn generate(client_id: &str) -> Self {
        let now = Utc::now();
        Self {
            invoice_id: format!("INV-{}", now.timestamp_millis()),
            client_id: client_id.to_string(),
            amount: rand::rng().random_range(100..=1099),
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}
