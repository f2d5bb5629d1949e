//! Error taxonomy shared by every crate in the workspace.

use thiserror::Error;

/// Errors surfaced by ledger access, chart synchronization and purchases.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaleError {
    /// RPC or network failure talking to the ledger node.
    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(String),
    /// Missing address or key, non-positive amount, malformed parameter.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Key material could not be used to sign.
    #[error("signature failure: {0}")]
    SignatureFailure(String),
    /// The node refused the transaction (insufficient funds, nonce conflict, ...).
    #[error("submission rejected: {0}")]
    SubmissionRejected(String),
}

impl SaleError {
    /// Builds a [`SaleError::LedgerUnavailable`] from any displayable error.
    pub fn ledger(err: impl std::fmt::Display) -> Self {
        Self::LedgerUnavailable(err.to_string())
    }

    /// Builds a [`SaleError::InvalidInput`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Result alias used across the workspace.
pub type SaleResult<T> = Result<T, SaleError>;
