//! Explicit context tying one ledger client to the chart and purchases.

use primitive_types::{H160, H256, U256};
use sale_domain::constants::{BUYIN_SELECTOR, STATEMENT_HASH_GETTER};
use sale_domain::value_objects::parse_address;
use sale_domain::{SaleError, SaleResult};
use sale_protocols::abi::selector;
use sale_protocols::ledger::LedgerClient;
use sale_protocols::rpc::RpcProvider;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

use crate::config::SaleConfig;
use crate::sync::ChartSynchronizer;
use crate::transaction::{PurchaseService, TransactionBuilder};

/// Sale contract constants, read once per context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleConstants {
    pub statement_hash: H256,
    pub buyin_selector: [u8; 4],
    pub sale_contract: H160,
}

/// Owns the ledger handle, the chart and the cached contract constants.
pub struct SaleContext {
    config: SaleConfig,
    ledger: Arc<dyn LedgerClient>,
    chart: ChartSynchronizer,
    constants: OnceCell<SaleConstants>,
}

impl SaleContext {
    pub fn new(config: SaleConfig, ledger: Arc<dyn LedgerClient>) -> Self {
        let chart = ChartSynchronizer::new(ledger.clone(), config.sale_contract);
        Self {
            config,
            ledger,
            chart,
            constants: OnceCell::new(),
        }
    }

    /// Creates a context backed by a JSON-RPC provider.
    pub fn connect(config: SaleConfig) -> Self {
        let provider = RpcProvider::new(config.rpc.clone());
        Self::new(config, Arc::new(provider))
    }

    pub fn config(&self) -> &SaleConfig {
        &self.config
    }

    pub fn ledger(&self) -> Arc<dyn LedgerClient> {
        self.ledger.clone()
    }

    pub fn chart(&self) -> &ChartSynchronizer {
        &self.chart
    }

    /// Contract constants, loaded on first use.
    ///
    /// A configured statement hash is used as-is; otherwise it is read from
    /// the contract. A failed load is not cached.
    pub async fn constants(&self) -> SaleResult<SaleConstants> {
        self.constants
            .get_or_try_init(|| async {
                let statement_hash = match self.config.statement_hash {
                    Some(hash) => hash,
                    None => self.fetch_statement_hash().await?,
                };
                info!(statement_hash = ?statement_hash, "Loaded sale constants");
                Ok::<_, SaleError>(SaleConstants {
                    statement_hash,
                    buyin_selector: BUYIN_SELECTOR,
                    sale_contract: self.config.sale_contract,
                })
            })
            .await
            .copied()
    }

    async fn fetch_statement_hash(&self) -> SaleResult<H256> {
        let data = self
            .ledger
            .call(self.config.sale_contract, &selector(STATEMENT_HASH_GETTER))
            .await?;
        if data.len() != 32 {
            return Err(SaleError::ledger(format!(
                "STATEMENT_HASH returned {} bytes",
                data.len()
            )));
        }
        Ok(H256::from_slice(&data))
    }

    /// Purchase service bound to this context's ledger and constants.
    pub async fn purchase_service(&self) -> SaleResult<PurchaseService> {
        let constants = self.constants().await?;
        Ok(PurchaseService::new(
            self.ledger.clone(),
            constants,
            TransactionBuilder::new(self.config.transaction_config()),
        ))
    }

    /// Signs and submits a purchase; see [`PurchaseService::purchase`].
    pub async fn purchase(
        &self,
        address: &str,
        spending: U256,
        private_key: &str,
    ) -> SaleResult<H256> {
        self.purchase_service()
            .await?
            .purchase(address, spending, private_key)
            .await
    }

    /// Current nonce of `address`.
    pub async fn nonce(&self, address: &str) -> SaleResult<U256> {
        self.ledger.get_nonce(parse_address(address)?).await
    }
}
