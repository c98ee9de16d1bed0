//! Outbound reply delivery.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

/// Delivery errors.
///
/// Only raised by the webhook notifier; the silent notifier never fails.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("chat post failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("chat post rejected: status {0}")]
    Status(reqwest::StatusCode),
}

/// Delivers one formatted reply to a destination channel.
///
/// Fire-and-forget from the handlers' point of view: nothing downstream
/// consumes a return value beyond error propagation.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post `text` to `channel_id`.
    async fn post(&self, channel_id: &str, text: &str) -> Result<(), NotifyError>;
}

/// Vocal notifier: posts replies to the chat backend's webhook.
pub struct WebhookNotifier {
    client: reqwest::Client,
    webhook_url: String,
    token: Option<String>,
}

impl WebhookNotifier {
    /// Create a webhook notifier for the given URL.
    pub fn new(webhook_url: String, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url,
            token,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn post(&self, channel_id: &str, text: &str) -> Result<(), NotifyError> {
        let body = serde_json::json!({
            "channel": channel_id,
            "text": text,
            "as_user": true,
        });

        let mut req = self.client.post(&self.webhook_url).json(&body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(NotifyError::Status(resp.status()));
        }

        debug!(channel = %channel_id, bytes = text.len(), "Reply delivered");
        Ok(())
    }
}

/// Silent notifier: logs what would have been posted instead of
/// delivering it.
pub struct SilentNotifier;

#[async_trait]
impl Notifier for SilentNotifier {
    async fn post(&self, channel_id: &str, text: &str) -> Result<(), NotifyError> {
        info!(channel = %channel_id, "Message that would have been posted:\n{}", text);
        Ok(())
    }
}
