//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use sale_execution::prelude::*;
//! ```

// Config
pub use crate::config::SaleConfig;

// Context
pub use crate::context::{SaleConstants, SaleContext};

// Sync
pub use crate::sync::{ChartSynchronizer, LogNormalizer, SubscriptionHandle, SyncStats};

// Transaction
pub use crate::transaction::{PurchaseService, TransactionBuilder, TransactionConfig};

// Wallet
pub use crate::wallet::Wallet;
