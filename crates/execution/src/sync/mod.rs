//! Chart synchronization with on-chain sale events.
//!
//! Provides:
//! - Block timestamp resolution for raw logs
//! - Historical backfill and live merging into one cumulative series
//! - Revocable live subscriptions

mod chart;
mod normalizer;
mod subscription;

pub use chart::*;
pub use normalizer::*;
pub use subscription::*;
