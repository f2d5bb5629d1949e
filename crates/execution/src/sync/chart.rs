//! Single-writer owner of the contribution chart.

use primitive_types::{H160, U256};
use sale_domain::entities::{ChartPoint, ChartSeries, EventLog, LogId};
use sale_domain::enums::EventName;
use sale_domain::{SaleError, SaleResult};
use sale_protocols::ledger::LedgerClient;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::normalizer::LogNormalizer;
use super::subscription::{SubscriptionHandle, spawn_subscription};

/// Counters describing how synchronization has gone so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    /// Batches committed to the series.
    pub batches_merged: u64,
    /// Batches dropped because of an error.
    pub batches_failed: u64,
    /// Logs skipped because they were already merged.
    pub duplicates_skipped: u64,
    /// Committed batches that started before the previous tail.
    pub out_of_order_batches: u64,
    /// Message of the most recent failure.
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
struct SeriesState {
    series: ChartSeries,
    merged: HashSet<LogId>,
}

/// Builds the cumulative chart from historical and live sale events.
///
/// Cloning is cheap and every clone shares the same series. All mutation goes
/// through one write lock, so backfill and live batches never interleave on
/// the append step. Ledger I/O happens before the lock is taken.
#[derive(Clone)]
pub struct ChartSynchronizer {
    ledger: Arc<dyn LedgerClient>,
    contract: H160,
    normalizer: LogNormalizer,
    state: Arc<RwLock<SeriesState>>,
    stats: Arc<RwLock<SyncStats>>,
}

impl ChartSynchronizer {
    /// Creates a synchronizer with an empty series.
    pub fn new(ledger: Arc<dyn LedgerClient>, contract: H160) -> Self {
        Self {
            normalizer: LogNormalizer::new(ledger.clone()),
            ledger,
            contract,
            state: Arc::new(RwLock::new(SeriesState::default())),
            stats: Arc::new(RwLock::new(SyncStats::default())),
        }
    }

    /// Fetches every historical sale event and merges it.
    ///
    /// Returns the number of points appended. On error the series is left as
    /// it was.
    pub async fn backfill(&self) -> SaleResult<usize> {
        info!(contract = ?self.contract, "Backfilling chart");

        let logs = match self.ledger.get_logs(self.contract, &EventName::CHART).await {
            Ok(logs) => logs,
            Err(e) => {
                self.record_failure(&e).await;
                return Err(e);
            }
        };

        let appended = self.ingest(logs).await?;
        info!(appended, "Backfill complete");
        Ok(appended)
    }

    /// Registers for live sale events; each delivered batch is merged.
    pub async fn subscribe(&self) -> SaleResult<SubscriptionHandle> {
        let subscription = self
            .ledger
            .subscribe(self.contract, &EventName::CHART)
            .await?;
        info!(contract = ?self.contract, "Subscribed to live sale events");
        Ok(spawn_subscription(self.clone(), subscription))
    }

    /// Subscribes, then backfills.
    ///
    /// The subscription is registered first so nothing emitted during the
    /// backfill is missed; logs seen by both are merged once. A backfill
    /// failure is logged and recorded in [`SyncStats`] but does not cancel the
    /// subscription.
    pub async fn start(&self) -> SaleResult<SubscriptionHandle> {
        let handle = self.subscribe().await?;
        if let Err(e) = self.backfill().await {
            error!(error = %e, "Backfill failed, continuing with live events only");
        }
        Ok(handle)
    }

    /// Normalizes a batch and merges the logs not merged before.
    ///
    /// Logs already in the series are dropped before any block is fetched;
    /// the check is repeated under the write lock.
    pub async fn ingest(&self, logs: Vec<EventLog>) -> SaleResult<usize> {
        let (logs, skipped) = self.unmerged(logs).await;

        let normalized = match self.normalizer.normalize(logs).await {
            Ok(logs) => logs,
            Err(e) => {
                self.record_failure(&e).await;
                return Err(e);
            }
        };

        match self.commit(normalized, skipped).await {
            Ok(appended) => Ok(appended),
            Err(e) => {
                self.record_failure(&e).await;
                Err(e)
            }
        }
    }

    async fn unmerged(&self, logs: Vec<EventLog>) -> (Vec<EventLog>, usize) {
        let state = self.state.read().await;
        let received = logs.len();
        let fresh: Vec<EventLog> = logs
            .into_iter()
            .filter(|log| !state.merged.contains(&log.id))
            .collect();
        let skipped = received - fresh.len();
        (fresh, skipped)
    }

    async fn commit(&self, logs: Vec<EventLog>, skipped: usize) -> SaleResult<usize> {
        let mut state = self.state.write().await;

        let received = logs.len();
        let mut batch_ids = HashSet::with_capacity(received);
        let fresh: Vec<EventLog> = logs
            .into_iter()
            .filter(|log| !state.merged.contains(&log.id) && batch_ids.insert(log.id))
            .collect();
        let duplicates = skipped + received - fresh.len();

        let outcome = state.series.merge(fresh)?;
        state.merged.extend(batch_ids);
        let total = state.series.last_total();
        drop(state);

        let mut stats = self.stats.write().await;
        stats.batches_merged += 1;
        stats.duplicates_skipped += duplicates as u64;
        if outcome.out_of_order {
            stats.out_of_order_batches += 1;
            warn!(
                appended = outcome.appended,
                "Batch starts before the chart tail, appended out of order"
            );
        }

        debug!(
            appended = outcome.appended,
            duplicates,
            total = %total,
            "Merged batch into chart"
        );
        Ok(outcome.appended)
    }

    pub(crate) async fn record_failure(&self, err: &SaleError) {
        let mut stats = self.stats.write().await;
        stats.batches_failed += 1;
        stats.last_error = Some(err.to_string());
    }

    /// Snapshot of the series, ascending by time within each merge.
    pub async fn chart_data(&self) -> Vec<ChartPoint> {
        self.state.read().await.series.points().to_vec()
    }

    /// Cumulative total of the last point.
    pub async fn last_total(&self) -> U256 {
        self.state.read().await.series.last_total()
    }

    pub async fn stats(&self) -> SyncStats {
        self.stats.read().await.clone()
    }

    pub fn contract(&self) -> H160 {
        self.contract
    }
}
