//! Domain vocabulary shared by the Bazaar crates.
//!
//! Pure types only: no database, HTTP, or runtime dependencies.

pub mod address;
pub mod order;
pub mod pagination;
pub mod product;
pub mod user;

/// A textual value did not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
