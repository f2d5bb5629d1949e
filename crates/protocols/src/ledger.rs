//! Async seam between the sale client and the remote ledger.

use async_trait::async_trait;
use primitive_types::{H160, H256, U256};
use sale_domain::SaleResult;
use sale_domain::entities::EventLog;
use sale_domain::enums::EventName;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Block header fields the client needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub number: u64,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
}

/// One delivery from a live subscription.
pub type LogBatch = SaleResult<Vec<EventLog>>;

/// Live stream of log batches.
///
/// Cancelling (or dropping) the subscription tells the producer to stop; batches
/// already queued can still be drained with [`LogSubscription::next`].
#[derive(Debug)]
pub struct LogSubscription {
    receiver: mpsc::Receiver<LogBatch>,
    cancel: CancellationToken,
}

impl LogSubscription {
    /// Creates a subscription and the sender its producer feeds.
    pub fn channel(capacity: usize) -> (mpsc::Sender<LogBatch>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            tx,
            Self {
                receiver: rx,
                cancel: CancellationToken::new(),
            },
        )
    }

    /// Waits for the next batch; `None` once the producer is gone.
    pub async fn next(&mut self) -> Option<LogBatch> {
        self.receiver.recv().await
    }

    /// Token observed by the producer.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for LogSubscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Operations the sale client performs against the ledger node.
///
/// Every call is a suspension point; implementations fail fast and never retry.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Looks up a block by number.
    async fn get_block(&self, number: u64) -> SaleResult<Block>;

    /// Returns every historical log of `events` emitted by `contract`.
    async fn get_logs(&self, contract: H160, events: &[EventName]) -> SaleResult<Vec<EventLog>>;

    /// Starts delivering new logs of `events` emitted by `contract`.
    async fn subscribe(&self, contract: H160, events: &[EventName])
    -> SaleResult<LogSubscription>;

    /// Next nonce to use for `address`, pending transactions included.
    async fn get_nonce(&self, address: H160) -> SaleResult<U256>;

    /// Broadcasts a signed transaction and returns its hash.
    async fn submit_raw_transaction(&self, raw: &[u8]) -> SaleResult<H256>;

    /// Read-only contract call against the latest block.
    async fn call(&self, to: H160, data: &[u8]) -> SaleResult<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscription_drains_queued_batches() {
        let (tx, mut subscription) = LogSubscription::channel(4);
        tx.send(Ok(Vec::new())).await.unwrap();
        drop(tx);

        assert!(matches!(subscription.next().await, Some(Ok(logs)) if logs.is_empty()));
        assert!(subscription.next().await.is_none());
    }

    #[tokio::test]
    async fn test_dropping_subscription_cancels_producer() {
        let (_tx, subscription) = LogSubscription::channel(1);
        let token = subscription.cancel_token();
        assert!(!token.is_cancelled());

        drop(subscription);
        assert!(token.is_cancelled());
    }
}
