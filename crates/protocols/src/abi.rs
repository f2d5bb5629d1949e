//! Minimal ABI support for the sale contract: static words only.

use primitive_types::{H256, U256};
use sale_domain::enums::EventName;
use sale_domain::value_objects::{StatementSignature, keccak256};
use sale_domain::{SaleError, SaleResult};

/// Width of one ABI word.
pub const WORD: usize = 32;

/// First four bytes of the Keccak hash of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash.as_bytes()[..4]);
    out
}

/// Topic0 of an event.
pub fn event_topic(event: EventName) -> H256 {
    keccak256(event.signature().as_bytes())
}

/// Resolves a topic0 back to the tracked event, if it is one.
pub fn event_for_topic(topic: &H256) -> Option<EventName> {
    EventName::CHART
        .into_iter()
        .find(|event| event_topic(*event) == *topic)
}

/// Big-endian 32-byte representation of a `U256`.
pub fn u256_to_word(value: U256) -> [u8; WORD] {
    let mut out = [0u8; WORD];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = value.byte(WORD - 1 - i);
    }
    out
}

/// Big-endian bytes with leading zeros removed; zero encodes as empty.
pub fn u256_to_trimmed_bytes(value: U256) -> Vec<u8> {
    let word = u256_to_word(value);
    let start = word.iter().position(|b| *b != 0).unwrap_or(WORD);
    word[start..].to_vec()
}

/// Reads the `index`-th static word of `data`.
pub fn decode_word(data: &[u8], index: usize) -> SaleResult<U256> {
    let start = index * WORD;
    let word = data.get(start..start + WORD).ok_or_else(|| {
        SaleError::invalid(format!(
            "abi data of {} bytes has no word {index}",
            data.len()
        ))
    })?;
    Ok(U256::from_big_endian(word))
}

/// `buyin(uint8 v, bytes32 r, bytes32 s)` call data.
pub fn encode_buyin_call(selector: [u8; 4], signature: &StatementSignature) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + 3 * WORD);
    data.extend_from_slice(&selector);
    data.extend_from_slice(&u256_to_word(U256::from(signature.v)));
    data.extend_from_slice(signature.r.as_bytes());
    data.extend_from_slice(signature.s.as_bytes());
    data
}
