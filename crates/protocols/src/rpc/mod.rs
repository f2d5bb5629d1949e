//! JSON-RPC 2.0 provider over HTTP.
//!
//! Implements [`LedgerClient`] with the standard `eth_*` methods. Live logs
//! are delivered by a polling task (see [`subscription`]), which works against
//! any HTTP endpoint without filter or websocket support.

mod subscription;
mod types;

use async_trait::async_trait;
use primitive_types::{H160, H256, U256};
use sale_domain::entities::EventLog;
use sale_domain::enums::EventName;
use sale_domain::value_objects::parse_h256;
use sale_domain::{SaleError, SaleResult};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use crate::abi::event_topic;
use crate::ledger::{Block, LedgerClient, LogSubscription};
use types::{
    RawBlock, RawLog, RpcErrorObject, RpcRequest, RpcResponse, decode_hex_bytes, encode_address,
    encode_hex_bytes, encode_quantity, encode_topic, parse_quantity, parse_quantity_u64,
};

/// Configuration for the RPC provider.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// HTTP endpoint of the ledger node.
    pub url: String,
    /// Delay between polls of a live subscription in milliseconds.
    pub poll_interval_ms: u64,
    /// Batches buffered per subscription before the poller waits.
    pub subscription_capacity: usize,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8545".to_string(),
            poll_interval_ms: 4_000,
            subscription_capacity: 64,
        }
    }
}

/// Failure of a single JSON-RPC call.
#[derive(Debug, Clone)]
pub(crate) enum CallError {
    /// HTTP, connection or decoding failure.
    Transport(String),
    /// The node answered with a JSON-RPC error object.
    Rpc(RpcErrorObject),
}

impl From<CallError> for SaleError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Transport(msg) => SaleError::LedgerUnavailable(msg),
            CallError::Rpc(e) => SaleError::LedgerUnavailable(format!("{} ({})", e.message, e.code)),
        }
    }
}

/// Ledger client speaking JSON-RPC over HTTP.
#[derive(Debug, Clone)]
pub struct RpcProvider {
    client: reqwest::Client,
    config: RpcConfig,
    next_id: Arc<AtomicU64>,
}

impl RpcProvider {
    /// Creates a new provider.
    pub fn new(config: RpcConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, CallError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        debug!(method, id, "RPC request");

        let response = self
            .client
            .post(&self.config.url)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| CallError::Transport(format!("{method}: {e}")))?;

        let response: RpcResponse = response
            .json()
            .await
            .map_err(|e| CallError::Transport(format!("{method}: {e}")))?;

        if let Some(error) = response.error {
            warn!(method, code = error.code, message = %error.message, "RPC error");
            return Err(CallError::Rpc(error));
        }

        serde_json::from_value(response.result.unwrap_or(serde_json::Value::Null))
            .map_err(|e| CallError::Transport(format!("{method}: unexpected result: {e}")))
    }

    /// Current head block number.
    pub async fn block_number(&self) -> SaleResult<u64> {
        let head: String = self.request("eth_blockNumber", json!([])).await?;
        parse_quantity_u64(&head)
    }

    /// Logs of `events` from `contract` in `from..=to` (`to = None` means latest).
    pub async fn fetch_logs(
        &self,
        contract: H160,
        events: &[EventName],
        from: u64,
        to: Option<u64>,
    ) -> SaleResult<Vec<EventLog>> {
        let topics: Vec<String> = events.iter().map(|e| encode_topic(&event_topic(*e))).collect();
        let to_block = to.map_or_else(|| "latest".to_string(), encode_quantity);

        let raw: Vec<RawLog> = self
            .request(
                "eth_getLogs",
                json!([{
                    "address": encode_address(&contract),
                    "fromBlock": encode_quantity(from),
                    "toBlock": to_block,
                    "topics": [topics],
                }]),
            )
            .await?;

        let mut logs = Vec::with_capacity(raw.len());
        for entry in &raw {
            if let Some(log) = entry.decode()? {
                logs.push(log);
            }
        }

        debug!(
            contract = %encode_address(&contract),
            from,
            received = raw.len(),
            decoded = logs.len(),
            "Fetched logs"
        );
        Ok(logs)
    }
}

#[async_trait]
impl LedgerClient for RpcProvider {
    async fn get_block(&self, number: u64) -> SaleResult<Block> {
        let raw: Option<RawBlock> = self
            .request(
                "eth_getBlockByNumber",
                json!([encode_quantity(number), false]),
            )
            .await?;

        let raw = raw.ok_or_else(|| SaleError::ledger(format!("block {number} not found")))?;
        Ok(Block {
            number: parse_quantity_u64(&raw.number)?,
            timestamp: parse_quantity_u64(&raw.timestamp)?,
        })
    }

    async fn get_logs(&self, contract: H160, events: &[EventName]) -> SaleResult<Vec<EventLog>> {
        self.fetch_logs(contract, events, 0, None).await
    }

    async fn subscribe(
        &self,
        contract: H160,
        events: &[EventName],
    ) -> SaleResult<LogSubscription> {
        let head = self.block_number().await?;
        Ok(subscription::spawn_log_poller(
            self.clone(),
            contract,
            events.to_vec(),
            head + 1,
            Duration::from_millis(self.config.poll_interval_ms),
            self.config.subscription_capacity,
        ))
    }

    async fn get_nonce(&self, address: H160) -> SaleResult<U256> {
        let count: String = self
            .request(
                "eth_getTransactionCount",
                json!([encode_address(&address), "pending"]),
            )
            .await?;
        parse_quantity(&count)
    }

    async fn submit_raw_transaction(&self, raw: &[u8]) -> SaleResult<H256> {
        let hash: String = self
            .request("eth_sendRawTransaction", json!([encode_hex_bytes(raw)]))
            .await
            .map_err(|e| match e {
                CallError::Rpc(err) => {
                    SaleError::SubmissionRejected(format!("{} ({})", err.message, err.code))
                }
                transport => SaleError::from(transport),
            })?;
        parse_h256(&hash).map_err(SaleError::ledger)
    }

    async fn call(&self, to: H160, data: &[u8]) -> SaleResult<Vec<u8>> {
        let result: String = self
            .request(
                "eth_call",
                json!([{ "to": encode_address(&to), "data": encode_hex_bytes(data) }, "latest"]),
            )
            .await?;
        decode_hex_bytes(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_config_default() {
        let config = RpcConfig::default();
        assert_eq!(config.url, "http://127.0.0.1:8545");
        assert!(config.poll_interval_ms > 0);
    }

    #[test]
    fn test_rpc_error_maps_to_ledger_unavailable() {
        let err: SaleError = CallError::Rpc(RpcErrorObject {
            code: -32000,
            message: "header not found".to_string(),
        })
        .into();
        assert!(matches!(err, SaleError::LedgerUnavailable(msg) if msg.contains("header not found")));
    }

    #[tokio::test]
    async fn test_unreachable_node_is_ledger_unavailable() {
        let provider = RpcProvider::new(RpcConfig {
            url: "http://127.0.0.1:9".to_string(),
            ..RpcConfig::default()
        });

        let err = provider.get_block(1).await.unwrap_err();
        assert!(matches!(err, SaleError::LedgerUnavailable(_)));
    }
}
