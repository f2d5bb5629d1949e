use primitive_types::{H160, H256, U256};
use serde::{Deserialize, Serialize};

/// Unsigned legacy transaction calling the sale's buy-in entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseTransaction {
    /// Sale contract address.
    pub to: H160,
    pub nonce: U256,
    /// Encoded `buyin(v, r, s)` call.
    pub data: Vec<u8>,
    pub gas_limit: U256,
    pub gas_price: U256,
    /// Spending amount in wei.
    pub value: U256,
    /// Replay-protection chain id; `None` signs without it.
    pub chain_id: Option<u64>,
}

/// A transaction after the envelope signature, ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub transaction: PurchaseTransaction,
    /// RLP wire bytes.
    pub raw: Vec<u8>,
    /// Keccak-256 of `raw`, the identifier the node will report.
    pub hash: H256,
}
