//! Runtime configuration for the sale client.

use primitive_types::{H160, H256, U256};
use sale_domain::constants::{GAS_LIMIT, GAS_PRICE_WEI, MAX_CHAIN_ID};
use sale_domain::value_objects::{parse_address, parse_h256};
use sale_domain::{SaleError, SaleResult};
use sale_protocols::rpc::RpcConfig;

use crate::transaction::TransactionConfig;

/// Configuration for the sale client.
#[derive(Debug, Clone)]
pub struct SaleConfig {
    /// Ledger node connection.
    pub rpc: RpcConfig,
    /// Sale contract address.
    pub sale_contract: H160,
    /// Chain id used for replay protection, if any.
    pub chain_id: Option<u64>,
    /// Gas limit for purchases.
    pub gas_limit: U256,
    /// Gas price for purchases in wei.
    pub gas_price: U256,
    /// Statement hash; read from the contract when unset.
    pub statement_hash: Option<H256>,
}

impl Default for SaleConfig {
    fn default() -> Self {
        Self {
            rpc: RpcConfig::default(),
            sale_contract: H160::zero(),
            chain_id: None,
            gas_limit: U256::from(GAS_LIMIT),
            gas_price: U256::from(GAS_PRICE_WEI),
            statement_hash: None,
        }
    }
}

impl SaleConfig {
    /// Reads the configuration from `SALE_*` environment variables.
    ///
    /// `SALE_CONTRACT` is required; every other variable falls back to its default.
    pub fn from_env() -> SaleResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> SaleResult<Self> {
        let mut config = Self::default();

        let contract = lookup("SALE_CONTRACT")
            .ok_or_else(|| SaleError::invalid("SALE_CONTRACT is not set"))?;
        config.sale_contract = parse_address(&contract)?;

        if let Some(url) = lookup("SALE_RPC_URL") {
            config.rpc.url = url;
        }
        if let Some(ms) = lookup("SALE_POLL_INTERVAL_MS") {
            config.rpc.poll_interval_ms = parse_number("SALE_POLL_INTERVAL_MS", &ms)?;
        }
        if let Some(id) = lookup("SALE_CHAIN_ID") {
            let chain_id = parse_number("SALE_CHAIN_ID", &id)?;
            if chain_id > MAX_CHAIN_ID {
                return Err(SaleError::invalid(format!(
                    "SALE_CHAIN_ID={chain_id} exceeds {MAX_CHAIN_ID}"
                )));
            }
            config.chain_id = Some(chain_id);
        }
        if let Some(limit) = lookup("SALE_GAS_LIMIT") {
            config.gas_limit = U256::from(parse_number("SALE_GAS_LIMIT", &limit)?);
        }
        if let Some(price) = lookup("SALE_GAS_PRICE") {
            config.gas_price = U256::from(parse_number("SALE_GAS_PRICE", &price)?);
        }
        if let Some(hash) = lookup("SALE_STATEMENT_HASH") {
            config.statement_hash = Some(parse_h256(&hash)?);
        }

        Ok(config)
    }

    pub fn transaction_config(&self) -> TransactionConfig {
        TransactionConfig {
            gas_limit: self.gas_limit,
            gas_price: self.gas_price,
            chain_id: self.chain_id,
        }
    }
}

fn parse_number(key: &str, value: &str) -> SaleResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|e| SaleError::invalid(format!("{key}={value}: {e}")))
}
