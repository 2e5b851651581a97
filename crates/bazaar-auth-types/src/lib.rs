//! Authentication types shared by the Bazaar crates.
//!
//! Provides JWT issuance and validation, bearer header parsing, and the
//! `Identity` extractor handlers use to learn who is calling.

pub mod bearer;
pub mod identity;
pub mod token;
