pub mod address;
pub mod amount;
pub mod hash;
pub mod signature;

pub use address::{checksum_address, parse_address, parse_h256};
pub use amount::Amount;
pub use hash::keccak256;
pub use signature::StatementSignature;
