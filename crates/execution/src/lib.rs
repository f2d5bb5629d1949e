//! Chart synchronization and purchase submission for the token sale.
//!
//! This crate provides:
//! - Log normalization (block timestamps resolved concurrently)
//! - A single-writer chart synchronizer fed by backfill and live batches
//! - Revocable live subscriptions
//! - Wallet signing and purchase transaction building
//! - An explicit context object tying these to one ledger client

/// Prelude module for convenient imports.
pub mod prelude;

/// Runtime configuration.
pub mod config;
/// Explicit sale context.
pub mod context;
/// Chart synchronization.
pub mod sync;
/// Purchase transaction building and submission.
pub mod transaction;
/// Key handling and signing.
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;
