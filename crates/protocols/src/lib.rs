//! Ledger access for the sale client.
//!
//! - [`ledger::LedgerClient`]: the async seam every component talks to
//! - [`rpc::RpcProvider`]: JSON-RPC over HTTP implementation
//! - [`abi`]: selectors, topics and word encoding for the sale contract

/// Contract ABI helpers.
pub mod abi;
/// Ledger client abstraction.
pub mod ledger;
/// Prelude module for convenient imports.
pub mod prelude;
/// JSON-RPC provider.
pub mod rpc;
