use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Includes settings for the RPC gateway side and the broker side.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub gateway: GatewaySettings,
    pub broker: BrokerSettings,
}

/// Configuration for the gateway's RPC side: where the hello backends
/// listen, and how long a call may wait for its reply.
#[derive(Debug, Deserialize, Clone)]
pub struct GatewaySettings {
    pub service_a_addr: String,
    pub service_b_addr: String,
    pub request_timeout_ms: u64,
}

/// Configuration for the broker side: the durable queue to consume, an
/// optional on-disk store location (in-memory when unset), and the upper
/// bound of the simulated processing delay.
#[derive(Debug, Deserialize, Clone)]
pub struct BrokerSettings {
    pub queue: String,
    pub data_dir: Option<String>,
    pub max_processing_delay_ms: u64,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub gateway: Option<PartialGatewaySettings>,
    pub broker: Option<PartialBrokerSettings>,
}

/// Partial gateway settings.
#[derive(Debug, Deserialize)]
pub struct PartialGatewaySettings {
    pub service_a_addr: Option<String>,
    pub service_b_addr: Option<String>,
    pub request_timeout_ms: Option<u64>,
}

/// Partial broker settings.
#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub queue: Option<String>,
    pub data_dir: Option<String>,
    pub max_processing_delay_ms: Option<u64>,
}

/// Provides default values for `Settings`.
///
/// Ensures the application has sensible defaults if no configuration is provided.
impl Default for Settings {
    fn default() -> Self {
        Self {
            gateway: GatewaySettings {
                service_a_addr: "127.0.0.1:4101".to_string(),
                service_b_addr: "127.0.0.1:4102".to_string(),
                request_timeout_ms: 5000,
            },
            broker: BrokerSettings {
                queue: "invoices".to_string(),
                data_dir: None,
                max_processing_delay_ms: 20_000,
            },
        }
    }
}
