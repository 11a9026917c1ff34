//! Core components, types, and utilities for the ticket-relay.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Webhook signature verification.
//! - Bounded retry with backoff.
//! - Common types, error taxonomy, and result handling.

pub mod config;
pub mod retry;
pub mod signature;
pub mod types;
