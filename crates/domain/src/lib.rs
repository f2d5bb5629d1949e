//! Core types for the token-sale client.
//!
//! Everything here is plain data plus the pure chart merge; ledger I/O lives in
//! `sale-protocols` and orchestration in `sale-execution`.

/// Sale-wide constants.
pub mod constants;
/// Entities with identity or lifecycle.
pub mod entities;
/// Enumerations shared across crates.
pub mod enums;
/// Error taxonomy.
pub mod error;
/// Value objects.
pub mod value_objects;

pub use error::{SaleError, SaleResult};
