//! Live batch delivery into the chart.

use sale_protocols::ledger::LogSubscription;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::chart::ChartSynchronizer;

/// Revocable handle to a running live subscription.
///
/// After [`SubscriptionHandle::cancel`] no further batch is merged; a batch
/// whose merge has already started is completed.
#[derive(Debug)]
pub struct SubscriptionHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether the delivery task has exited (cancelled or stream closed).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the delivery task to exit without cancelling it.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            error!(error = %e, "Subscription task panicked");
        }
    }

    /// Cancels and waits for any in-flight merge to finish.
    pub async fn stop(self) {
        self.cancel();
        self.join().await;
    }
}

pub(crate) fn spawn_subscription(
    synchronizer: ChartSynchronizer,
    mut subscription: LogSubscription,
) -> SubscriptionHandle {
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        loop {
            let batch = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    info!("Live subscription cancelled");
                    break;
                }
                batch = subscription.next() => batch,
            };

            let Some(batch) = batch else {
                info!("Live subscription stream closed");
                break;
            };

            match batch {
                Ok(logs) => {
                    debug!(logs = logs.len(), "Received live batch");
                    if let Err(e) = synchronizer.ingest(logs).await {
                        error!(error = %e, "Dropped live batch");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Live subscription delivered an error");
                    synchronizer.record_failure(&e).await;
                }
            }
        }

        subscription.cancel();
    });

    SubscriptionHandle { cancel, task }
}
