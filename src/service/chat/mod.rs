pub mod webhook;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::RelayError;

// Traits.

/// Generic "chat" trait that notification sinks must implement.
///
/// This trait defines the one thing the relay needs from a chat platform:
/// pushing a rendered notification into the configured channel. Implementing
/// it allows different chat services to be swapped in without touching the
/// webhook pipeline.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Send a notification message to the configured channel.
    ///
    /// Failures come back already classified, so the endpoint can map them
    /// straight to a gateway status without re-inspecting the transport.
    async fn send_notification(&self, text: &str) -> Result<(), RelayError>;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
