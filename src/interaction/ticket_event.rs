//! Inbound ticket-update webhook handling.

use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    base::{signature, types::RelayError},
    interaction::{format, ticket},
    runtime::Runtime,
};

// Structs.

/// Acknowledgement body returned after a successful relay.
#[derive(Debug, Serialize, Deserialize)]
pub struct RelayAck {
    pub status: String,
    pub ticket_id: u64,
}

// Handlers.

/// Handles a ticket-update notification from the helpdesk platform.
///
/// The pipeline is strictly ordered: the signature is verified over the raw
/// body bytes before anything is parsed, the body is parsed into a typed
/// ticket, the notification text is rendered, and only then does the chat
/// delivery run. A failure at any stage maps to its [`RelayError`] status.
#[instrument(skip_all)]
pub async fn handle_ticket_event(State(runtime): State<Runtime>, headers: HeaderMap, body: Bytes) -> Result<Json<RelayAck>, RelayError> {
    let claimed = headers.get(signature::SIGNATURE_HEADER).and_then(|value| value.to_str().ok());

    signature::verify_signature(&body, claimed, &runtime.config.helpdesk_signing_secret)?;

    let ticket = ticket::parse_ticket(&body)?;
    let text = format::render_ticket_message(&ticket);

    runtime.chat.send_notification(&text).await?;

    info!("Relayed update for ticket {}.", ticket.id);

    Ok(Json(RelayAck {
        status: "delivered".to_string(),
        ticket_id: ticket.id,
    }))
}
