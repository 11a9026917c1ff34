//! Webhook implementation of the chat service.
//!
//! Posts notifications to the chat platform's incoming-webhook API: a JSON
//! `message` event addressed to a channel, delivered with a bounded number
//! of attempts. Transient failures (timeouts, connection errors, non-2xx
//! responses) are retried under the configured [`RetryPolicy`]; the last
//! failure's classification is what the caller sees.

use crate::base::{
    config::Config,
    retry::{RetryPolicy, run_with_retry},
    types::{RelayError, Res},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use std::sync::Arc;

use super::{ChatClient, GenericChatClient};

// Constants.

/// Header carrying the 1-based number of the delivery attempt.
pub const DELIVERY_ATTEMPT_HEADER: &str = "x-relay-delivery-attempt";

/// Header carrying the RFC 3339 timestamp of the delivery attempt.
pub const DELIVERY_TIMESTAMP_HEADER: &str = "x-relay-timestamp";

// Extra methods on `ChatClient` applied by the webhook implementation.

impl ChatClient {
    /// Creates a new webhook chat client from the application config.
    pub fn webhook(config: &Config) -> Res<Self> {
        Ok(WebhookChatClient::new(config)?.into())
    }
}

impl From<WebhookChatClient> for ChatClient {
    fn from(client: WebhookChatClient) -> Self {
        Self { inner: Arc::new(client) }
    }
}

// Structs.

/// Wire body accepted by the chat platform's webhook endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub channel: String,
    pub event: String,
    pub data: MessageData,
}

/// Payload of an outbound `message` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageData {
    pub text: String,
}

impl OutboundMessage {
    /// Builds a `message` event addressed to the given channel.
    pub fn new(channel: &str, text: &str) -> Self {
        Self {
            channel: channel.to_string(),
            event: "message".to_string(),
            data: MessageData { text: text.to_string() },
        }
    }
}

/// Webhook client implementation.
#[derive(Debug, Clone)]
pub struct WebhookChatClient {
    client: reqwest::Client,
    url: String,
    channel_id: String,
    policy: RetryPolicy,
}

impl WebhookChatClient {
    /// Create a new webhook chat client.
    #[instrument(name = "WebhookChatClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let client = reqwest::Client::builder().timeout(config.delivery_timeout()).redirect(reqwest::redirect::Policy::limited(3)).build()?;

        // The channel id is the final path segment of the webhook URL.

        let url = format!("{}/{}", config.chat_webhook_base_url.trim_end_matches('/'), config.chat_channel_id);

        info!("Chat webhook target: {}", url);

        Ok(Self {
            client,
            url,
            channel_id: config.chat_channel_id.clone(),
            policy: config.delivery_policy(),
        })
    }

    /// Performs a single delivery attempt.
    async fn post_once(&self, attempt: u32, text: &str) -> Result<(), RelayError> {
        let message = OutboundMessage::new(&self.channel_id, text);

        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(DELIVERY_ATTEMPT_HEADER, attempt.to_string())
            .header(DELIVERY_TIMESTAMP_HEADER, chrono::Utc::now().to_rfc3339())
            .json(&message)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();

        if !status.is_success() {
            return Err(RelayError::UpstreamError(format!("HTTP {}", status.as_u16())));
        }

        debug!(status = status.as_u16(), attempt, "Chat platform accepted the notification.");

        Ok(())
    }
}

#[async_trait]
impl GenericChatClient for WebhookChatClient {
    #[instrument(name = "WebhookChatClient::send_notification", skip_all)]
    async fn send_notification(&self, text: &str) -> Result<(), RelayError> {
        run_with_retry(&self.policy, RelayError::is_retryable, |attempt| self.post_once(attempt, text)).await?;

        info!("Notification delivered to the chat platform.");

        Ok(())
    }
}

// Helpers.

/// Classifies a transport-level failure from the HTTP client.
///
/// Timeouts are kept distinct from other transport errors so the endpoint
/// can answer 504 rather than 502.
fn classify_transport_error(err: reqwest::Error) -> RelayError {
    if err.is_timeout() {
        RelayError::UpstreamTimeout
    } else if err.is_connect() {
        RelayError::UpstreamError(format!("connection failed: {err}"))
    } else {
        RelayError::UpstreamError(err.to_string())
    }
}

// Tests.
