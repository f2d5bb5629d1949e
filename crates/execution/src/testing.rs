//! In-memory ledger used by unit tests.

use async_trait::async_trait;
use primitive_types::{H160, H256, U256};
use sale_domain::entities::{EventLog, LogId};
use sale_domain::enums::EventName;
use sale_domain::value_objects::keccak256;
use sale_domain::{SaleError, SaleResult};
use sale_protocols::ledger::{Block, LedgerClient, LogBatch, LogSubscription};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Notify, mpsc};

#[derive(Default)]
pub(crate) struct MockLedger {
    blocks: Mutex<HashMap<u64, u64>>,
    failing_blocks: Mutex<HashSet<u64>>,
    logs: Mutex<Vec<EventLog>>,
    fail_logs: Mutex<bool>,
    live: Mutex<Option<mpsc::Sender<LogBatch>>>,
    nonce: Mutex<u64>,
    fail_nonce: Mutex<bool>,
    rejection: Mutex<Option<String>>,
    submitted: Mutex<Vec<Vec<u8>>>,
    statement_hash: Mutex<H256>,
    block_gate: Mutex<Option<Arc<Notify>>>,
    block_calls: AtomicUsize,
    nonce_calls: AtomicUsize,
    submit_calls: AtomicUsize,
    call_calls: AtomicUsize,
}

/// Unresolved log of `accounted` emitted in `block`.
pub(crate) fn log(index: u64, block: u64, accounted: u64) -> EventLog {
    EventLog::new(
        H160::repeat_byte(0x5a),
        EventName::Buyin,
        block,
        LogId {
            transaction_hash: H256::from_low_u64_be(index),
            log_index: index,
        },
        U256::from(accounted),
    )
}

impl MockLedger {
    pub fn add_block(&self, number: u64, timestamp: u64) {
        self.blocks.lock().unwrap().insert(number, timestamp);
    }

    /// Holds every later `get_block` until the returned gate is notified.
    pub fn gate_blocks(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.block_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn fail_block(&self, number: u64) {
        self.failing_blocks.lock().unwrap().insert(number);
    }

    pub fn set_logs(&self, logs: Vec<EventLog>) {
        *self.logs.lock().unwrap() = logs;
    }

    pub fn fail_logs(&self) {
        *self.fail_logs.lock().unwrap() = true;
    }

    /// Sender feeding the most recent subscription.
    pub fn take_live_sender(&self) -> mpsc::Sender<LogBatch> {
        self.live.lock().unwrap().take().expect("no active subscription")
    }

    pub fn set_nonce(&self, nonce: u64) {
        *self.nonce.lock().unwrap() = nonce;
    }

    pub fn fail_nonce(&self) {
        *self.fail_nonce.lock().unwrap() = true;
    }

    pub fn reject_submissions(&self, reason: &str) {
        *self.rejection.lock().unwrap() = Some(reason.to_string());
    }

    pub fn set_statement_hash(&self, hash: H256) {
        *self.statement_hash.lock().unwrap() = hash;
    }

    pub fn submitted(&self) -> Vec<Vec<u8>> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn block_calls(&self) -> usize {
        self.block_calls.load(Ordering::SeqCst)
    }

    pub fn nonce_calls(&self) -> usize {
        self.nonce_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn call_calls(&self) -> usize {
        self.call_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn get_block(&self, number: u64) -> SaleResult<Block> {
        self.block_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        let gate = self.block_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.failing_blocks.lock().unwrap().contains(&number) {
            return Err(SaleError::LedgerUnavailable(format!("block {number} timed out")));
        }
        let timestamp = self
            .blocks
            .lock()
            .unwrap()
            .get(&number)
            .copied()
            .ok_or_else(|| SaleError::LedgerUnavailable(format!("block {number} not found")))?;
        Ok(Block { number, timestamp })
    }

    async fn get_logs(&self, _contract: H160, _events: &[EventName]) -> SaleResult<Vec<EventLog>> {
        if *self.fail_logs.lock().unwrap() {
            return Err(SaleError::LedgerUnavailable("eth_getLogs failed".to_string()));
        }
        Ok(self.logs.lock().unwrap().clone())
    }

    async fn subscribe(
        &self,
        _contract: H160,
        _events: &[EventName],
    ) -> SaleResult<LogSubscription> {
        let (tx, subscription) = LogSubscription::channel(16);
        *self.live.lock().unwrap() = Some(tx);
        Ok(subscription)
    }

    async fn get_nonce(&self, _address: H160) -> SaleResult<U256> {
        self.nonce_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_nonce.lock().unwrap() {
            return Err(SaleError::LedgerUnavailable("connection reset".to_string()));
        }
        Ok(U256::from(*self.nonce.lock().unwrap()))
    }

    async fn submit_raw_transaction(&self, raw: &[u8]) -> SaleResult<H256> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.rejection.lock().unwrap().clone() {
            return Err(SaleError::SubmissionRejected(reason));
        }
        self.submitted.lock().unwrap().push(raw.to_vec());
        Ok(keccak256(raw))
    }

    async fn call(&self, _to: H160, _data: &[u8]) -> SaleResult<Vec<u8>> {
        self.call_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.statement_hash.lock().unwrap().as_bytes().to_vec())
    }
}
