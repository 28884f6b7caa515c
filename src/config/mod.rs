mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{BrokerSettings, GatewaySettings, Settings};

/// Loads the configuration from the default file and environment variables
/// Merges the configuration with default values
/// Returns a `Settings` struct containing the gateway and broker configurations
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::default().separator("_"));

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    Ok(Settings {
        gateway: GatewaySettings {
            service_a_addr: partial
                .gateway
                .as_ref()
                .and_then(|g| g.service_a_addr.clone())
                .unwrap_or(default.gateway.service_a_addr),
            service_b_addr: partial
                .gateway
                .as_ref()
                .and_then(|g| g.service_b_addr.clone())
                .unwrap_or(default.gateway.service_b_addr),
            request_timeout_ms: partial
                .gateway
                .as_ref()
                .and_then(|g| g.request_timeout_ms)
                .unwrap_or(default.gateway.request_timeout_ms),
        },
        broker: BrokerSettings {
            queue: partial
                .broker
                .as_ref()
                .and_then(|b| b.queue.clone())
                .unwrap_or(default.broker.queue),
            data_dir: partial
                .broker
                .as_ref()
                .and_then(|b| b.data_dir.clone())
                .or(default.broker.data_dir),
            max_processing_delay_ms: partial
                .broker
                .as_ref()
                .and_then(|b| b.max_processing_delay_ms)
                .unwrap_or(default.broker.max_processing_delay_ms),
        },
    })
}
