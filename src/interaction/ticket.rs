//! Typed inbound ticket payloads from the helpdesk platform.
//!
//! The helpdesk platform posts a JSON body wrapping the updated ticket.
//! Parsing is strict: required fields must be present and `status`/`priority`
//! must be known enum values. An unknown value is a hard parse error rather
//! than a silent fallback, so upstream payload changes surface as 400s
//! instead of mislabeled notifications.

use serde::{Deserialize, Serialize};

use crate::base::types::RelayError;

/// Inbound webhook body: wraps the ticket being updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundWebhook {
    pub ticket: Ticket,
}

/// A helpdesk support ticket, as carried by update notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: u64,
    pub subject: String,
    pub status: TicketStatus,
    /// Absent or `null` both mean the ticket has no priority assigned.
    #[serde(default)]
    pub priority: Option<TicketPriority>,
    pub requester: Requester,
}

/// The person who opened the ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Requester {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Lifecycle state of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    New,
    Open,
    Pending,
    Solved,
    Closed,
}

impl TicketStatus {
    /// Short human-readable label used in chat notifications.
    pub fn label(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Open => "Open",
            Self::Pending => "Pending",
            Self::Solved => "Solved",
            Self::Closed => "Closed",
        }
    }
}

/// Urgency assigned to a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Low,
    Normal,
    High,
    Urgent,
}

impl TicketPriority {
    /// Short human-readable label used in chat notifications.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Normal => "Normal",
            Self::High => "High",
            Self::Urgent => "Urgent",
        }
    }
}

/// Parses the raw webhook body into a [`Ticket`].
///
/// Any structural problem maps to [`RelayError::InvalidPayload`] carrying
/// serde's field-level message, which the endpoint returns in the 400 body.
pub fn parse_ticket(body: &[u8]) -> Result<Ticket, RelayError> {
    let webhook = serde_json::from_slice::<InboundWebhook>(body).map_err(|err| RelayError::InvalidPayload(err.to_string()))?;

    Ok(webhook.ticket)
}

// Tests.
