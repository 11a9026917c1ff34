//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for services used by the relay:
//! - Chat services (e.g., the platform's incoming-webhook API)
//!
//! Each service module defines both a generic trait and concrete
//! implementations, allowing for extensibility and easy testing.

pub mod chat;
