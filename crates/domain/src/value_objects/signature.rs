use primitive_types::H256;
use serde::{Deserialize, Serialize};

/// Recoverable ECDSA signature in the `(v, r, s)` layout the sale contract expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementSignature {
    /// Recovery byte, 27 or 28.
    pub v: u8,
    pub r: H256,
    pub s: H256,
}

impl StatementSignature {
    /// Recovery id in the `0..=1` range.
    pub fn recovery_id(&self) -> u8 {
        self.v.saturating_sub(27)
    }
}
