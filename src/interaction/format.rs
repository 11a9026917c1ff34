//! Renders ticket updates as plain-text chat notifications.

use crate::interaction::ticket::Ticket;

/// Label shown when a ticket has no priority assigned.
const PRIORITY_NOT_SET: &str = "Not set";

/// Renders the notification text for a ticket update.
///
/// The message is a fixed five-line template so notifications stay scannable
/// in the channel regardless of which fields the helpdesk filled in.
pub fn render_ticket_message(ticket: &Ticket) -> String {
    let priority = ticket.priority.map(|p| p.label()).unwrap_or(PRIORITY_NOT_SET);

    format!(
        "Ticket #{id} Updated!\nSubject: {subject}\nStatus: {status}\nPriority: {priority}\nRequester: {requester}",
        id = ticket.id,
        subject = ticket.subject,
        status = ticket.status.label(),
        requester = ticket.requester.email,
    )
}

// Tests.
