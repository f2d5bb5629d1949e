//! Legacy transaction envelope for purchases.

use primitive_types::{H160, H256, U256};
use rlp::RlpStream;
use sale_domain::constants::{GAS_LIMIT, GAS_PRICE_WEI};
use sale_domain::{SaleError, SaleResult};
use sale_domain::entities::{PurchaseTransaction, SignedTransaction};
use sale_domain::value_objects::keccak256;
use sale_protocols::abi::u256_to_trimmed_bytes;
use tracing::debug;

use crate::wallet::Wallet;

/// Gas and replay-protection settings applied to every purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionConfig {
    pub gas_limit: U256,
    pub gas_price: U256,
    /// Chain id for replay protection; `None` signs without it.
    pub chain_id: Option<u64>,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            gas_limit: U256::from(GAS_LIMIT),
            gas_price: U256::from(GAS_PRICE_WEI),
            chain_id: None,
        }
    }
}

impl TransactionConfig {
    /// Upper bound of the fee paid on top of the spending amount.
    pub fn max_gas_cost(&self) -> U256 {
        self.gas_limit.saturating_mul(self.gas_price)
    }
}

/// Builds and signs purchase transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    config: TransactionConfig,
}

impl TransactionBuilder {
    pub fn new(config: TransactionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransactionConfig {
        &self.config
    }

    /// Assembles the unsigned envelope.
    pub fn build(&self, to: H160, nonce: U256, data: Vec<u8>, value: U256) -> PurchaseTransaction {
        PurchaseTransaction {
            to,
            nonce,
            data,
            gas_limit: self.config.gas_limit,
            gas_price: self.config.gas_price,
            value,
            chain_id: self.config.chain_id,
        }
    }

    /// Signs the envelope and serializes it to wire format.
    pub fn sign(
        &self,
        transaction: PurchaseTransaction,
        wallet: &Wallet,
    ) -> SaleResult<SignedTransaction> {
        let signature = wallet.sign_hash(&signing_hash(&transaction))?;

        let v = match transaction.chain_id {
            Some(chain_id) => replay_protected_v(signature.recovery_id(), chain_id)?,
            None => u64::from(signature.v),
        };

        let mut stream = RlpStream::new_list(9);
        append_fields(&mut stream, &transaction);
        stream.append(&v);
        stream.append(&u256_to_trimmed_bytes(U256::from_big_endian(signature.r.as_bytes())));
        stream.append(&u256_to_trimmed_bytes(U256::from_big_endian(signature.s.as_bytes())));
        let raw = stream.out().to_vec();
        let hash = keccak256(&raw);

        debug!(
            hash = %hash,
            nonce = %transaction.nonce,
            bytes = raw.len(),
            "Signed purchase transaction"
        );

        Ok(SignedTransaction {
            transaction,
            raw,
            hash,
        })
    }
}

/// Digest signed by the envelope signature.
pub fn signing_hash(transaction: &PurchaseTransaction) -> H256 {
    let mut stream = match transaction.chain_id {
        Some(_) => RlpStream::new_list(9),
        None => RlpStream::new_list(6),
    };
    append_fields(&mut stream, transaction);
    if let Some(chain_id) = transaction.chain_id {
        stream.append(&chain_id);
        stream.append_empty_data();
        stream.append_empty_data();
    }
    keccak256(stream.out())
}

fn replay_protected_v(recovery_id: u8, chain_id: u64) -> SaleResult<u64> {
    chain_id
        .checked_mul(2)
        .and_then(|v| v.checked_add(35 + u64::from(recovery_id)))
        .ok_or_else(|| SaleError::SignatureFailure(format!("chain id {chain_id} overflows v")))
}

fn append_fields(stream: &mut RlpStream, transaction: &PurchaseTransaction) {
    stream.append(&u256_to_trimmed_bytes(transaction.nonce));
    stream.append(&u256_to_trimmed_bytes(transaction.gas_price));
    stream.append(&u256_to_trimmed_bytes(transaction.gas_limit));
    stream.append(&transaction.to.as_bytes().to_vec());
    stream.append(&u256_to_trimmed_bytes(transaction.value));
    stream.append(&transaction.data);
}
