//! Protocol-level constants of the sale contract.

/// Selector of `buyin(uint8,bytes32,bytes32)`.
pub const BUYIN_SELECTOR: [u8; 4] = [0xd0, 0x28, 0x00, 0x37];

/// Signature of the public getter exposing the statement hash.
pub const STATEMENT_HASH_GETTER: &str = "STATEMENT_HASH()";

/// Gas limit attached to every purchase.
pub const GAS_LIMIT: u64 = 200_000;

/// Gas price attached to every purchase (5 gwei).
pub const GAS_PRICE_WEI: u64 = 5_000_000_000;

/// Decimals of the native currency (wei per ether).
pub const ETHER_DECIMALS: u8 = 18;

/// Largest chain id whose EIP-155 `v` (`recovery_id + 35 + 2 * chain_id`) fits in a `u64`.
pub const MAX_CHAIN_ID: u64 = (u64::MAX - 36) / 2;
