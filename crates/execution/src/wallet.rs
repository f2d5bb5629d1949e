//! Buyer key handling.
//!
//! Signatures are deterministic (RFC 6979) secp256k1 ECDSA with low-S
//! normalization, returned in the `(v, r, s)` layout with `v` in `{27, 28}`.

use k256::ecdsa::SigningKey;
use primitive_types::{H160, H256};
use sale_domain::value_objects::{StatementSignature, keccak256};
use sale_domain::{SaleError, SaleResult};
use std::fmt;
use zeroize::Zeroizing;

/// A buyer's signing key and derived address.
pub struct Wallet {
    signing_key: SigningKey,
    address: H160,
}

impl Wallet {
    /// Loads a wallet from `0x`-prefixed (or bare) hex key material.
    ///
    /// # Errors
    /// Returns [`SaleError::SignatureFailure`] if the input is not a valid
    /// secp256k1 secret key.
    pub fn from_private_key_hex(key: &str) -> SaleResult<Self> {
        let trimmed = key.trim();
        let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = Zeroizing::new(
            hex::decode(stripped)
                .map_err(|e| SaleError::SignatureFailure(format!("private key is not hex: {e}")))?,
        );
        Self::from_bytes(&bytes)
    }

    /// Loads a wallet from raw 32-byte key material.
    pub fn from_bytes(bytes: &[u8]) -> SaleResult<Self> {
        if bytes.len() != 32 {
            return Err(SaleError::SignatureFailure(format!(
                "private key must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|e| SaleError::SignatureFailure(format!("invalid private key: {e}")))?;
        let address = address_of(&signing_key);

        Ok(Self {
            signing_key,
            address,
        })
    }

    pub fn address(&self) -> H160 {
        self.address
    }

    /// Signs a 32-byte digest as-is (no message prefix).
    pub fn sign_hash(&self, hash: &H256) -> SaleResult<StatementSignature> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(hash.as_bytes())
            .map_err(|e| SaleError::SignatureFailure(e.to_string()))?;

        let bytes = signature.to_bytes();
        Ok(StatementSignature {
            v: 27 + recovery_id.to_byte(),
            r: H256::from_slice(&bytes[..32]),
            s: H256::from_slice(&bytes[32..]),
        })
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

fn address_of(signing_key: &SigningKey) -> H160 {
    let point = signing_key.verifying_key().to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    H160::from_slice(&hash.as_bytes()[12..])
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
    use sale_domain::value_objects::{checksum_address, parse_address};

    pub(crate) const TEST_KEY: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    pub(crate) const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    /// Address recovered from a `(v, r, s)` signature over `hash`.
    pub(crate) fn recover(hash: &H256, signature: &StatementSignature) -> H160 {
        let mut rs = [0u8; 64];
        rs[..32].copy_from_slice(signature.r.as_bytes());
        rs[32..].copy_from_slice(signature.s.as_bytes());
        let sig = Signature::from_slice(&rs).unwrap();
        let recid = RecoveryId::from_byte(signature.recovery_id()).unwrap();
        let key = VerifyingKey::recover_from_prehash(hash.as_bytes(), &sig, recid).unwrap();

        let point = key.to_encoded_point(false);
        H160::from_slice(&keccak256(&point.as_bytes()[1..]).as_bytes()[12..])
    }

    #[test]
    fn test_address_derivation_known_key() {
        let wallet = Wallet::from_private_key_hex(TEST_KEY).unwrap();
        assert_eq!(checksum_address(&wallet.address()), TEST_ADDRESS);
        assert_eq!(wallet.address(), parse_address(TEST_ADDRESS).unwrap());
    }

    #[test]
    fn test_sign_hash_is_deterministic_and_recoverable() {
        let wallet = Wallet::from_private_key_hex(TEST_KEY).unwrap();
        let hash = keccak256(b"statement of sale terms");

        let first = wallet.sign_hash(&hash).unwrap();
        let second = wallet.sign_hash(&hash).unwrap();

        assert_eq!(first, second);
        assert!(first.v == 27 || first.v == 28);
        assert_eq!(recover(&hash, &first), wallet.address());
    }

    #[test]
    fn test_malformed_keys_are_signature_failures() {
        for key in ["0xnothex", "0x1234", &format!("0x{}", "00".repeat(32))] {
            let err = Wallet::from_private_key_hex(key).unwrap_err();
            assert!(matches!(err, SaleError::SignatureFailure(_)), "{key}");
        }
    }

    #[test]
    fn test_debug_hides_key() {
        let wallet = Wallet::from_private_key_hex(TEST_KEY).unwrap();
        let rendered = format!("{wallet:?}");
        assert!(!rendered.contains("ac0974bec39a17e3"));
    }
}
