//! Teams incoming-webhook notifier.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::domain::models::{ChangeEvent, TeamsConfig};
use crate::domain::ports::Notifier;

use super::card::MessageCard;

/// Posts notifications to a Microsoft Teams incoming webhook.
///
/// Delivery failures (transport errors and non-2xx answers) are logged
/// and swallowed; the poller never waits on or retries a notification.
#[derive(Debug, Clone)]
pub struct TeamsNotifier {
    /// Target webhook URL.
    webhook_url: String,
    /// Shared HTTP client (connection pooling).
    client: Client,
}

impl TeamsNotifier {
    /// Create a notifier posting to `webhook_url`.
    pub fn new(webhook_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            webhook_url: webhook_url.into(),
            client: Client::builder().timeout(timeout).build()?,
        })
    }

    /// Create a notifier from the `teams` configuration section.
    pub fn from_config(config: &TeamsConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            config.webhook_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }
}

#[async_trait]
impl Notifier for TeamsNotifier {
    async fn publish(&self, payload: Vec<u8>) {
        let response = match self
            .client
            .post(&self.webhook_url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Error while publishing to MS Teams");
                return;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(%status, body = %body, "MS Teams webhook returned non-2xx status");
            return;
        }

        tracing::debug!(%status, "Teams notification delivered");
    }

    async fn notify(&self, event: &ChangeEvent) {
        match serde_json::to_vec(&MessageCard::from_event(event)) {
            Ok(payload) => self.publish(payload).await,
            Err(e) => tracing::warn!(
                source = %event.source_name,
                error = %e,
                "Failed to render Teams card"
            ),
        }
    }

    fn channel_name(&self) -> &str {
        "teams"
    }
}
