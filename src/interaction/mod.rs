//! Webhook event handling for the relay.
//!
//! This module provides the inbound half of the pipeline:
//! - Parsing ticket-update payloads into typed tickets
//! - Rendering notification text from a ticket
//! - Handling the webhook endpoint (verify, parse, render, deliver)

pub mod format;
pub mod ticket;
pub mod ticket_event;
