//! Parsing and display helpers for `0x`-prefixed hex values.

use primitive_types::{H160, H256};

use super::hash::keccak256;
use crate::error::{SaleError, SaleResult};

fn decode_fixed(input: &str, len: usize, what: &str) -> SaleResult<Vec<u8>> {
    let trimmed = input.trim();
    let stripped = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let bytes =
        hex::decode(stripped).map_err(|e| SaleError::invalid(format!("{what} `{input}`: {e}")))?;

    if bytes.len() != len {
        return Err(SaleError::invalid(format!(
            "{what} `{input}` must be {len} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

/// Parses a 20-byte account address. Checksum casing is not enforced.
pub fn parse_address(input: &str) -> SaleResult<H160> {
    decode_fixed(input, 20, "address").map(|b| H160::from_slice(&b))
}

/// Parses a 32-byte hash.
pub fn parse_h256(input: &str) -> SaleResult<H256> {
    decode_fixed(input, 32, "hash").map(|b| H256::from_slice(&b))
}

/// Mixed-case checksum rendering of an address (EIP-55).
pub fn checksum_address(address: &H160) -> String {
    let lower = hex::encode(address.as_bytes());
    let digest = keccak256(lower.as_bytes());
    let digest = digest.as_bytes();

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = (digest[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_accepts_prefix_and_mixed_case() {
        let a = parse_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap();
        let b = parse_address("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_address_rejects_wrong_length() {
        let err = parse_address("0x1234").unwrap_err();
        assert!(matches!(err, SaleError::InvalidInput(_)));
    }

    #[test]
    fn test_parse_h256_rejects_non_hex() {
        assert!(parse_h256(&format!("0x{}", "zz".repeat(32))).is_err());
    }

    #[test]
    fn test_checksum_address_known_vectors() {
        for expected in [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        ] {
            let address = parse_address(expected).unwrap();
            assert_eq!(checksum_address(&address), expected);
        }
    }
}
