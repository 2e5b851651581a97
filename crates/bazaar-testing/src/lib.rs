//! Test utilities for Bazaar services.
//!
//! Use from dev-dependencies only.

pub mod auth;
pub mod envelope;
