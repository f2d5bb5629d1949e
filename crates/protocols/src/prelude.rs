//! Prelude module for convenient imports.
//!
//! ```rust
//! use sale_protocols::prelude::*;
//! ```

pub use crate::abi::{encode_buyin_call, event_topic, selector};
pub use crate::ledger::{Block, LedgerClient, LogBatch, LogSubscription};
pub use crate::rpc::{RpcConfig, RpcProvider};
