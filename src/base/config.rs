//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc, time::Duration};

use serde::Deserialize;

use super::{
    retry::{Backoff, RetryPolicy},
    types::Res,
};

// Covers verification, parsing, and response writing on top of the delivery schedule.
const REQUEST_TIMEOUT_HEADROOM: Duration = Duration::from_secs(5);

/// Default base URL of the chat platform's webhook API.
fn default_chat_webhook_base_url() -> String {
    "https://ping.telex.im/v1/webhooks".to_string()
}

/// Default host to bind the inbound listener to.
fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default port to bind the inbound listener to.
fn default_port() -> u16 {
    8000
}

/// Default per-attempt timeout for outbound delivery, in seconds.
fn default_delivery_timeout_seconds() -> u64 {
    10
}

/// Default total number of delivery attempts.
fn default_delivery_max_attempts() -> u32 {
    3
}

/// Default base delay between delivery attempts, in milliseconds.
fn default_delivery_base_delay_ms() -> u64 {
    1000
}

/// Configuration for the ticket-relay application.
///
/// Loaded once at startup and shared read-only across all requests;
/// nothing reads the environment after [`Config::load`] returns.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// The shared configuration values.
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// The actual configuration values behind [`Config`].
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Chat channel that receives ticket notifications (`TICKET_RELAY_CHAT_CHANNEL_ID`).
    pub chat_channel_id: String,
    /// Base URL of the chat platform's webhook API (`TICKET_RELAY_CHAT_WEBHOOK_BASE_URL`).
    /// The channel id is appended as the final path segment.
    #[serde(default = "default_chat_webhook_base_url")]
    pub chat_webhook_base_url: String,
    /// Shared secret the helpdesk platform signs webhook bodies with
    /// (`TICKET_RELAY_HELPDESK_SIGNING_SECRET`).
    pub helpdesk_signing_secret: String,
    /// Host to bind the inbound listener to (`TICKET_RELAY_HOST`).
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind the inbound listener to (`TICKET_RELAY_PORT`).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-attempt timeout for outbound delivery, in seconds
    /// (`TICKET_RELAY_DELIVERY_TIMEOUT_SECONDS`).
    #[serde(default = "default_delivery_timeout_seconds")]
    pub delivery_timeout_seconds: u64,
    /// Total number of delivery attempts, including the first
    /// (`TICKET_RELAY_DELIVERY_MAX_ATTEMPTS`).
    #[serde(default = "default_delivery_max_attempts")]
    pub delivery_max_attempts: u32,
    /// Base delay between delivery attempts, in milliseconds
    /// (`TICKET_RELAY_DELIVERY_BASE_DELAY_MS`). The n-th retry waits
    /// `n * base_delay`.
    #[serde(default = "default_delivery_base_delay_ms")]
    pub delivery_base_delay_ms: u64,
}

impl Config {
    /// Loads configuration from the environment and an optional TOML file.
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("TICKET_RELAY"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        if result.chat_channel_id.is_empty() {
            return Err(anyhow::anyhow!("Chat channel id must not be empty."));
        }

        if result.helpdesk_signing_secret.is_empty() {
            return Err(anyhow::anyhow!("Helpdesk signing secret must not be empty."));
        }

        if result.delivery_max_attempts < 1 {
            return Err(anyhow::anyhow!("Delivery max attempts must be at least 1."));
        }

        if result.delivery_timeout_seconds < 1 {
            return Err(anyhow::anyhow!("Delivery timeout must be at least 1 second."));
        }

        Ok(result)
    }

    /// Per-attempt timeout for outbound delivery.
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery_timeout_seconds)
    }

    /// Base delay between delivery attempts.
    pub fn delivery_base_delay(&self) -> Duration {
        Duration::from_millis(self.delivery_base_delay_ms)
    }

    /// Retry policy applied to outbound delivery.
    pub fn delivery_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.delivery_max_attempts,
            base_delay: self.delivery_base_delay(),
            backoff: Backoff::Linear,
        }
    }

    /// Upper bound on handling one inbound request.
    ///
    /// Sized above the worst-case delivery schedule (every attempt spending
    /// the full per-attempt timeout, plus the backoff sleeps between
    /// attempts) so a slow delivery is always answered by the endpoint's own
    /// status mapping rather than cut off mid-flight.
    pub fn request_timeout(&self) -> Duration {
        let attempt_budget = self.delivery_timeout() * self.delivery_max_attempts;

        attempt_budget + self.delivery_policy().total_backoff() + REQUEST_TIMEOUT_HEADROOM
    }
}

// Tests.
