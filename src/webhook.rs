//! Webhook delivery.
//!
//! Posts one collection report to every registered destination. Deliveries
//! run concurrently and settle independently: a slow or failing destination
//! never blocks the others, and no failure escalates past a warning.

use crate::error::{Result, TrackError};
use futures_util::future::join_all;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Request timeout for a single delivery. Bounds how long a hung destination
/// can delay a collection run.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Outbound message payload.
///
/// Wire shape: `{"msg_type": "text", "content": {"text": "..."}}`.
#[derive(Debug, Clone, Serialize)]
pub struct NotifyPayload {
    msg_type: &'static str,
    content: NotifyContent,
}

#[derive(Debug, Clone, Serialize)]
struct NotifyContent {
    text: String,
}

impl NotifyPayload {
    /// Build a text payload.
    #[must_use]
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            msg_type: "text",
            content: NotifyContent {
                text: message.into(),
            },
        }
    }

    /// The message text carried by this payload.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.content.text
    }
}

/// Result of delivering one payload to one destination.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    /// Destination URL.
    pub target: String,
    /// `None` on success, otherwise why the delivery failed.
    pub error: Option<String>,
}

impl DispatchOutcome {
    /// Returns `true` when the delivery was accepted.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Posts payloads to registered webhook destinations.
pub struct WebhookDispatcher {
    client: reqwest::Client,
}

impl WebhookDispatcher {
    /// Build a dispatcher with the default request timeout.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TrackError::Dispatch(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Deliver `payload` to every target concurrently.
    ///
    /// Returns one outcome per target, in target order. An empty target list
    /// sends nothing and returns an empty vec.
    pub async fn dispatch(
        &self,
        targets: &[String],
        payload: &NotifyPayload,
    ) -> Vec<DispatchOutcome> {
        if targets.is_empty() {
            debug!("no webhook destinations registered, skipping dispatch");
            return Vec::new();
        }

        let deliveries = targets.iter().map(|target| self.deliver(target, payload));
        join_all(deliveries).await
    }

    async fn deliver(&self, target: &str, payload: &NotifyPayload) -> DispatchOutcome {
        match self.post(target, payload).await {
            Ok(()) => DispatchOutcome {
                target: target.to_owned(),
                error: None,
            },
            Err(e) => {
                warn!("webhook delivery to {target} failed: {e}");
                DispatchOutcome {
                    target: target.to_owned(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn post(&self, target: &str, payload: &NotifyPayload) -> Result<()> {
        let response = self
            .client
            .post(target)
            .json(payload)
            .send()
            .await
            .map_err(|e| TrackError::Dispatch(format!("request to {target} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TrackError::Dispatch(format!(
                "delivery rejected ({status}): {body}"
            )));
        }
        Ok(())
    }
}
