//! Wire shapes of the JSON-RPC methods the provider calls.

use primitive_types::{H160, H256, U256};
use sale_domain::entities::{EventLog, LogId};
use sale_domain::value_objects::{parse_address, parse_h256};
use sale_domain::{SaleError, SaleResult};
use serde::{Deserialize, Serialize};

use crate::abi::{decode_word, event_for_topic};

#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse {
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawBlock {
    pub number: String,
    pub timestamp: String,
}

/// Log as returned by `eth_getLogs`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawLog {
    pub address: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: String,
    pub block_number: Option<String>,
    pub transaction_hash: Option<String>,
    pub log_index: Option<String>,
    #[serde(default)]
    pub removed: bool,
}

impl RawLog {
    /// Decodes a tracked sale event.
    ///
    /// Returns `Ok(None)` for logs that were reorged out or carry an untracked topic.
    pub fn decode(&self) -> SaleResult<Option<EventLog>> {
        if self.removed {
            return Ok(None);
        }

        let Some(topic0) = self.topics.first() else {
            return Ok(None);
        };
        let Some(event_name) = event_for_topic(&parse_h256(topic0)?) else {
            return Ok(None);
        };

        let block_number =
            required(&self.block_number, "blockNumber").and_then(parse_quantity_u64)?;
        let transaction_hash =
            required(&self.transaction_hash, "transactionHash").and_then(parse_h256)?;
        let log_index = required(&self.log_index, "logIndex").and_then(parse_quantity_u64)?;

        let data = decode_hex_bytes(&self.data)?;
        let accounted = decode_word(&data, 0)?;

        Ok(Some(EventLog::new(
            parse_address(&self.address)?,
            event_name,
            block_number,
            LogId {
                transaction_hash,
                log_index,
            },
            accounted,
        )))
    }
}

fn required<'a>(field: &'a Option<String>, name: &str) -> SaleResult<&'a str> {
    field
        .as_deref()
        .ok_or_else(|| SaleError::ledger(format!("log is missing {name}")))
}

fn strip_hex_prefix(input: &str) -> &str {
    input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input)
}

/// Parses a JSON-RPC quantity (`0x`-prefixed, no leading zeros required).
pub(crate) fn parse_quantity(input: &str) -> SaleResult<U256> {
    let digits = strip_hex_prefix(input);
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_str_radix(digits, 16)
        .map_err(|e| SaleError::ledger(format!("bad quantity `{input}`: {e:?}")))
}

pub(crate) fn parse_quantity_u64(input: &str) -> SaleResult<u64> {
    let value = parse_quantity(input)?;
    if value > U256::from(u64::MAX) {
        return Err(SaleError::ledger(format!("quantity `{input}` exceeds u64")));
    }
    Ok(value.as_u64())
}

pub(crate) fn decode_hex_bytes(input: &str) -> SaleResult<Vec<u8>> {
    hex::decode(strip_hex_prefix(input))
        .map_err(|e| SaleError::ledger(format!("bad hex data: {e}")))
}

pub(crate) fn encode_hex_bytes(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub(crate) fn encode_address(address: &H160) -> String {
    encode_hex_bytes(address.as_bytes())
}

pub(crate) fn encode_topic(topic: &H256) -> String {
    encode_hex_bytes(topic.as_bytes())
}

pub(crate) fn encode_quantity(value: u64) -> String {
    format!("{value:#x}")
}
