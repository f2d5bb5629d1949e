//! Purchase transaction building, signing and submission.
//!
//! - [`TransactionBuilder`]: envelope assembly, RLP encoding, envelope signature
//! - [`PurchaseService`]: the end-to-end purchase flow against a ledger client

mod builder;
mod purchase;

pub use builder::*;
pub use purchase::*;
