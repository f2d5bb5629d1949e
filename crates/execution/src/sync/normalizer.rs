//! Resolves block numbers of raw logs to wall-clock timestamps.

use chrono::{DateTime, TimeZone, Utc};
use futures::future::try_join_all;
use sale_domain::entities::EventLog;
use sale_domain::{SaleError, SaleResult};
use sale_protocols::ledger::LedgerClient;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Annotates logs with the timestamp of the block they were emitted in.
#[derive(Clone)]
pub struct LogNormalizer {
    ledger: Arc<dyn LedgerClient>,
}

impl LogNormalizer {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }

    /// Returns the same logs with timestamps resolved.
    ///
    /// Each distinct block is fetched once and all fetches run concurrently.
    /// If any fetch fails the whole batch is dropped and the error returned;
    /// no log comes back partially annotated.
    pub async fn normalize(&self, logs: Vec<EventLog>) -> SaleResult<Vec<EventLog>> {
        if logs.is_empty() {
            return Ok(logs);
        }

        let numbers: BTreeSet<u64> = logs.iter().map(|log| log.block_number).collect();
        let blocks = try_join_all(numbers.iter().map(|n| self.ledger.get_block(*n))).await?;

        let mut times: HashMap<u64, DateTime<Utc>> = HashMap::with_capacity(blocks.len());
        for (number, block) in numbers.iter().zip(blocks) {
            times.insert(*number, block_time(*number, block.timestamp)?);
        }

        debug!(logs = logs.len(), blocks = times.len(), "Resolved log timestamps");

        logs.into_iter()
            .map(|log| {
                let time = times.get(&log.block_number).copied().ok_or_else(|| {
                    SaleError::ledger(format!("block {} was not resolved", log.block_number))
                })?;
                Ok(log.with_timestamp(time))
            })
            .collect()
    }
}

fn block_time(number: u64, timestamp: u64) -> SaleResult<DateTime<Utc>> {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .ok_or_else(|| {
            SaleError::ledger(format!("block {number} has invalid timestamp {timestamp}"))
        })
}
