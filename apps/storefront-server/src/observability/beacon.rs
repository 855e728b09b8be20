//! Error beacon layer for tracing.
//!
//! ERROR-level events are copied into a [`Beacon`] and handed to a sink
//! (stderr in development, a webhook in production) off the logging path.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{Event, Subscriber};
use tracing_subscriber::{Layer, layer::Context};

const BUFFER_SIZE: usize = 100;

/// One reported error event.
#[derive(Debug, Clone, Serialize)]
pub struct Beacon {
    pub service: String,
    pub target: String,
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub fields: BTreeMap<String, String>,
}

/// Destination for beacons.
#[async_trait::async_trait]
pub trait BeaconSink: Send + Sync {
    async fn send(&self, beacon: Beacon) -> Result<(), BeaconError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BeaconError {
    #[error("Failed to deliver beacon: {0}")]
    Delivery(String),
}

/// Writes beacons to stderr.
pub struct ConsoleSink;

#[async_trait::async_trait]
impl BeaconSink for ConsoleSink {
    async fn send(&self, beacon: Beacon) -> Result<(), BeaconError> {
        let fields = beacon
            .fields
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(" ");
        eprintln!(
            "[beacon] {} {} {}: {} {}",
            beacon.timestamp.to_rfc3339(),
            beacon.service,
            beacon.target,
            beacon.message,
            fields
        );
        Ok(())
    }
}

/// Posts beacons as JSON to a webhook URL.
pub struct WebhookSink {
    url: String,
    client: reqwest::Client,
}

impl WebhookSink {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl BeaconSink for WebhookSink {
    async fn send(&self, beacon: Beacon) -> Result<(), BeaconError> {
        self.client
            .post(&self.url)
            .json(&beacon)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| BeaconError::Delivery(e.to_string()))?;

        Ok(())
    }
}

/// Tracing layer that forwards ERROR-level events to a [`BeaconSink`].
///
/// Must be created inside a Tokio runtime. Events are dropped when the
/// channel is full.
pub struct BeaconLayer {
    service: String,
    sender: mpsc::Sender<Beacon>,
}

impl BeaconLayer {
    pub fn new(service: impl Into<String>, sink: Arc<dyn BeaconSink>) -> Self {
        let (tx, mut rx) = mpsc::channel::<Beacon>(BUFFER_SIZE);

        tokio::spawn(async move {
            while let Some(beacon) = rx.recv().await {
                if let Err(e) = sink.send(beacon).await {
                    // Not traced: that would feed back into this layer.
                    eprintln!("{}", e);
                }
            }
        });

        Self {
            service: service.into(),
            sender: tx,
        }
    }

    pub fn console(service: impl Into<String>) -> Self {
        Self::new(service, Arc::new(ConsoleSink))
    }

    pub fn webhook(service: impl Into<String>, url: String) -> Self {
        Self::new(service, Arc::new(WebhookSink::new(url)))
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: BTreeMap<String, String>,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.record_str(field, &format!("{:?}", value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields
                .insert(field.name().to_string(), value.to_string());
        }
    }
}

impl<S> Layer<S> for BeaconLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != tracing::Level::ERROR {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let beacon = Beacon {
            service: self.service.clone(),
            target: event.metadata().target().to_string(),
            message: visitor.message,
            timestamp: chrono::Utc::now(),
            fields: visitor.fields,
        };

        let _ = self.sender.try_send(beacon);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    struct ChannelSink(mpsc::UnboundedSender<Beacon>);

    #[async_trait::async_trait]
    impl BeaconSink for ChannelSink {
        async fn send(&self, beacon: Beacon) -> Result<(), BeaconError> {
            self.0
                .send(beacon)
                .map_err(|e| BeaconError::Delivery(e.to_string()))
        }
    }

    #[tokio::test]
    async fn test_only_errors_are_forwarded() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let layer = BeaconLayer::new("storefront-test", Arc::new(ChannelSink(tx)));
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("corrupt record ignored");
            tracing::error!(kind = "lookup_failed", context = "pe", "catalog offline");
        });

        let beacon = rx.recv().await.unwrap();
        assert_eq!(beacon.service, "storefront-test");
        assert_eq!(beacon.message, "catalog offline");
        assert_eq!(beacon.fields.get("kind").map(String::as_str), Some("lookup_failed"));
        assert_eq!(beacon.fields.get("context").map(String::as_str), Some("pe"));
        assert!(rx.try_recv().is_err());
    }
}
