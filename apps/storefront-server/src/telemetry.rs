//! Telemetry initialization - tracing and error beacons.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::observability::BeaconLayer;

/// Telemetry configuration.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Enable JSON logging (for production).
    pub json_logs: bool,
    pub service_name: String,
    /// Forward ERROR events to the beacon sink.
    pub beacon_enabled: bool,
    /// Webhook receiving beacons; stderr is used when unset.
    pub beacon_webhook_url: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            json_logs: false,
            service_name: "storefront".to_string(),
            beacon_enabled: true,
            beacon_webhook_url: None,
        }
    }
}

impl TelemetryConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            json_logs: lookup("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            service_name: lookup("SERVICE_NAME").unwrap_or_else(|| "storefront".to_string()),
            beacon_enabled: lookup("BEACON_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            beacon_webhook_url: lookup("BEACON_WEBHOOK_URL").filter(|url| !url.is_empty()),
        }
    }
}

/// Install the global subscriber. Must run inside the Tokio runtime.
pub fn init_telemetry(config: &TelemetryConfig) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,storefront_server=debug,storefront_infra=debug")
    });

    let beacon_layer = config.beacon_enabled.then(|| match &config.beacon_webhook_url {
        Some(url) => BeaconLayer::webhook(config.service_name.clone(), url.clone()),
        None => BeaconLayer::console(config.service_name.clone()),
    });

    if config.json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .with(beacon_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .with(beacon_layer)
            .init();
    }

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        beacon_enabled = config.beacon_enabled,
        webhook = config.beacon_webhook_url.is_some(),
        "Telemetry initialized"
    );
}
