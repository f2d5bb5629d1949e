//! Polling-based live log delivery.

use async_trait::async_trait;
use primitive_types::H160;
use sale_domain::SaleResult;
use sale_domain::entities::EventLog;
use sale_domain::enums::EventName;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::RpcProvider;
use crate::ledger::{LogBatch, LogSubscription};

/// The two queries a poll is made of.
#[async_trait]
pub(super) trait LogSource: Send + Sync {
    /// Current head block number.
    async fn head(&self) -> SaleResult<u64>;

    /// Logs of `events` from `contract` in `from..=to`.
    async fn logs_between(
        &self,
        contract: H160,
        events: &[EventName],
        from: u64,
        to: u64,
    ) -> SaleResult<Vec<EventLog>>;
}

#[async_trait]
impl LogSource for RpcProvider {
    async fn head(&self) -> SaleResult<u64> {
        self.block_number().await
    }

    async fn logs_between(
        &self,
        contract: H160,
        events: &[EventName],
        from: u64,
        to: u64,
    ) -> SaleResult<Vec<EventLog>> {
        self.fetch_logs(contract, events, from, Some(to)).await
    }
}

/// Cursor over the block ranges already delivered.
#[derive(Debug)]
struct LogPoller {
    contract: H160,
    events: Vec<EventName>,
    next_from: u64,
}

impl LogPoller {
    /// Runs one poll.
    ///
    /// The cursor moves past `head` only when the range was fetched, so a
    /// failed range is asked for again. Returns `None` when there is nothing
    /// to deliver.
    async fn poll(&mut self, source: &impl LogSource) -> Option<LogBatch> {
        let head = match source.head().await {
            Ok(head) => head,
            Err(e) => return Some(Err(e)),
        };
        if head < self.next_from {
            return None;
        }

        match source
            .logs_between(self.contract, &self.events, self.next_from, head)
            .await
        {
            Ok(logs) => {
                self.next_from = head + 1;
                (!logs.is_empty()).then_some(Ok(logs))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Spawns a task that polls `source` for logs from `start_block` onwards.
///
/// Each block range is delivered at most once. Failed polls are forwarded as
/// `Err` batches and the same range is retried on the next tick.
pub(super) fn spawn_log_poller<S>(
    source: S,
    contract: H160,
    events: Vec<EventName>,
    start_block: u64,
    interval: Duration,
    capacity: usize,
) -> LogSubscription
where
    S: LogSource + 'static,
{
    let (tx, subscription) = LogSubscription::channel(capacity);
    let cancel = subscription.cancel_token();

    info!(start_block, interval_ms = interval.as_millis() as u64, "Starting log poller");

    tokio::spawn(async move {
        let mut poller = LogPoller {
            contract,
            events,
            next_from: start_block,
        };
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let Some(batch) = poller.poll(&source).await else {
                continue;
            };

            tokio::select! {
                _ = cancel.cancelled() => break,
                sent = tx.send(batch) => {
                    if sent.is_err() {
                        break;
                    }
                }
            }
        }

        debug!(next_from = poller.next_from, "Log poller stopped");
    });

    subscription
}
