//! Library root for `ticket-relay`.
//!
//! Ticket-relay is a webhook relay for helpdesk ticket updates designed to:
//! - Verify that inbound notifications really came from the helpdesk platform
//! - Parse ticket updates into typed payloads
//! - Render scannable chat notifications
//! - Forward them to a chat channel webhook with bounded retry
//!
//! Inbound traffic is authenticated with HMAC-SHA256 over the raw request
//! body; outbound delivery goes to the chat platform's incoming-webhook API.
//! The architecture is built around extensible traits that allow for
//! different implementations of the chat service.

#[deny(missing_docs)]
pub mod base;
pub mod interaction;
pub mod runtime;
pub mod server;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the relay runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with the chat client
/// - Starts the inbound webhook listener
pub async fn start(config: Config) -> Void {
    info!("Starting ticket-relay ...");

    // Start the crypto provider.
    crypto::ring::default_provider().install_default().unwrap();

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config)?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
