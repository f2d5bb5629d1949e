//! End-to-end purchase flow.
//!
//! A purchase is consequential: every failure is returned to the caller as-is,
//! nothing is retried, and the transaction reaches the ledger only once it is
//! fully signed.

use primitive_types::{H160, H256, U256};
use sale_domain::entities::SignedTransaction;
use sale_domain::value_objects::{checksum_address, parse_address};
use sale_domain::{SaleError, SaleResult};
use sale_protocols::abi::encode_buyin_call;
use sale_protocols::ledger::LedgerClient;
use std::sync::Arc;
use tracing::{info, warn};

use super::TransactionBuilder;
use crate::context::SaleConstants;
use crate::wallet::Wallet;

/// Builds, signs and submits `buyin` transactions.
pub struct PurchaseService {
    ledger: Arc<dyn LedgerClient>,
    constants: SaleConstants,
    builder: TransactionBuilder,
}

impl PurchaseService {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        constants: SaleConstants,
        builder: TransactionBuilder,
    ) -> Self {
        Self {
            ledger,
            constants,
            builder,
        }
    }

    /// Signs and submits a purchase of `spending` wei for `address`.
    ///
    /// Resolves once the node accepts the transaction, not on confirmation.
    ///
    /// # Errors
    /// - [`SaleError::InvalidInput`] for a missing or mismatched address, a
    ///   missing key or a zero amount
    /// - [`SaleError::SignatureFailure`] for malformed key material
    /// - [`SaleError::LedgerUnavailable`] if the nonce or submission call fails
    /// - [`SaleError::SubmissionRejected`] if the node refuses the transaction
    pub async fn purchase(
        &self,
        address: &str,
        spending: U256,
        private_key: &str,
    ) -> SaleResult<H256> {
        let signed = self.prepare(address, spending, private_key).await?;

        let hash = self
            .ledger
            .submit_raw_transaction(&signed.raw)
            .await
            .inspect_err(|e| warn!(error = %e, "Purchase submission failed"))?;

        info!(
            hash = %hash,
            contract = %checksum_address(&signed.transaction.to),
            nonce = %signed.transaction.nonce,
            "Purchase submitted"
        );
        Ok(hash)
    }

    /// Runs every purchase step except submission.
    pub async fn prepare(
        &self,
        address: &str,
        spending: U256,
        private_key: &str,
    ) -> SaleResult<SignedTransaction> {
        let (buyer, wallet) = validate(address, spending, private_key)?;

        info!(buyer = %checksum_address(&buyer), spending = %spending, "Preparing purchase");

        // Fetched right before signing so the nonce is as fresh as possible.
        let nonce = self.ledger.get_nonce(buyer).await?;

        let statement_signature = wallet.sign_hash(&self.constants.statement_hash)?;
        let data = encode_buyin_call(self.constants.buyin_selector, &statement_signature);

        let transaction = self
            .builder
            .build(self.constants.sale_contract, nonce, data, spending);
        self.builder.sign(transaction, &wallet)
    }
}

fn validate(address: &str, spending: U256, private_key: &str) -> SaleResult<(H160, Wallet)> {
    if address.trim().is_empty() {
        return Err(SaleError::invalid("no address"));
    }
    if private_key.trim().is_empty() {
        return Err(SaleError::invalid("no private key"));
    }
    if spending.is_zero() {
        return Err(SaleError::invalid("spending amount must be positive"));
    }

    let buyer = parse_address(address)?;
    let wallet = Wallet::from_private_key_hex(private_key)?;
    if wallet.address() != buyer {
        return Err(SaleError::invalid(format!(
            "private key does not belong to {}",
            checksum_address(&buyer)
        )));
    }

    Ok((buyer, wallet))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockLedger;
    use crate::wallet::tests::{TEST_ADDRESS, TEST_KEY, recover};
    use rlp::Rlp;
    use sale_domain::constants::BUYIN_SELECTOR;
    use sale_domain::value_objects::{StatementSignature, keccak256};
    use sale_protocols::abi::decode_word;

    fn constants() -> SaleConstants {
        SaleConstants {
            statement_hash: keccak256(b"terms and conditions"),
            buyin_selector: BUYIN_SELECTOR,
            sale_contract: H160::repeat_byte(0x5a),
        }
    }

    fn service(ledger: Arc<MockLedger>) -> PurchaseService {
        PurchaseService::new(ledger, constants(), TransactionBuilder::default())
    }

    fn one_ether() -> U256 {
        U256::from(1_000_000_000_000_000_000u128)
    }

    #[tokio::test]
    async fn test_purchase_uses_fetched_nonce_and_sale_contract() {
        let ledger = Arc::new(MockLedger::default());
        ledger.set_nonce(7);

        let hash = service(ledger.clone())
            .purchase(TEST_ADDRESS, one_ether(), TEST_KEY)
            .await
            .unwrap();

        let submitted = ledger.submitted();
        assert_eq!(submitted.len(), 1);
        let raw = &submitted[0];
        assert_eq!(hash, keccak256(raw));

        let rlp = Rlp::new(raw);
        let nonce: Vec<u8> = rlp.val_at(0).unwrap();
        let to: Vec<u8> = rlp.val_at(3).unwrap();
        let value: Vec<u8> = rlp.val_at(4).unwrap();
        assert_eq!(U256::from_big_endian(&nonce), U256::from(7));
        assert_eq!(H160::from_slice(&to), constants().sale_contract);
        assert_eq!(U256::from_big_endian(&value), one_ether());
    }

    #[tokio::test]
    async fn test_call_data_carries_statement_signature() {
        let ledger = Arc::new(MockLedger::default());
        let signed = service(ledger)
            .prepare(TEST_ADDRESS, one_ether(), TEST_KEY)
            .await
            .unwrap();

        let data = &signed.transaction.data;
        assert_eq!(&data[..4], &BUYIN_SELECTOR);

        let words = &data[4..];
        let signature = StatementSignature {
            v: decode_word(words, 0).unwrap().as_u32() as u8,
            r: H256::from_slice(&words[32..64]),
            s: H256::from_slice(&words[64..96]),
        };
        assert_eq!(
            recover(&constants().statement_hash, &signature),
            parse_address(TEST_ADDRESS).unwrap()
        );
    }

    #[tokio::test]
    async fn test_zero_spending_is_rejected_before_ledger_access() {
        let ledger = Arc::new(MockLedger::default());
        let err = service(ledger.clone())
            .purchase(TEST_ADDRESS, U256::zero(), TEST_KEY)
            .await
            .unwrap_err();

        assert!(matches!(err, SaleError::InvalidInput(_)));
        assert_eq!(ledger.nonce_calls(), 0);
        assert!(ledger.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_missing_address_or_key_is_invalid_input() {
        let ledger = Arc::new(MockLedger::default());
        let service = service(ledger);

        for (address, key) in [("", TEST_KEY), (TEST_ADDRESS, ""), ("  ", TEST_KEY)] {
            let err = service.purchase(address, one_ether(), key).await.unwrap_err();
            assert!(matches!(err, SaleError::InvalidInput(_)));
        }
    }

    #[tokio::test]
    async fn test_malformed_key_is_signature_failure() {
        let ledger = Arc::new(MockLedger::default());
        let err = service(ledger)
            .purchase(TEST_ADDRESS, one_ether(), "0xdeadbeef")
            .await
            .unwrap_err();
        assert!(matches!(err, SaleError::SignatureFailure(_)));
    }

    #[tokio::test]
    async fn test_key_for_other_address_is_invalid_input() {
        let ledger = Arc::new(MockLedger::default());
        let err = service(ledger.clone())
            .purchase(
                "0x1111111111111111111111111111111111111111",
                one_ether(),
                TEST_KEY,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SaleError::InvalidInput(_)));
        assert_eq!(ledger.nonce_calls(), 0);
    }

    #[tokio::test]
    async fn test_nonce_failure_submits_nothing() {
        let ledger = Arc::new(MockLedger::default());
        ledger.fail_nonce();

        let err = service(ledger.clone())
            .purchase(TEST_ADDRESS, one_ether(), TEST_KEY)
            .await
            .unwrap_err();

        assert!(matches!(err, SaleError::LedgerUnavailable(_)));
        assert!(ledger.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_rejection_propagates_without_retry() {
        let ledger = Arc::new(MockLedger::default());
        ledger.reject_submissions("insufficient funds for gas * price + value");

        let err = service(ledger.clone())
            .purchase(TEST_ADDRESS, one_ether(), TEST_KEY)
            .await
            .unwrap_err();

        assert!(matches!(err, SaleError::SubmissionRejected(msg) if msg.contains("insufficient")));
        assert_eq!(ledger.submit_calls(), 1);
        assert_eq!(ledger.nonce_calls(), 1);
    }
}
