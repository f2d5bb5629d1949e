use chrono::{DateTime, Utc};
use primitive_types::{H160, H256, U256};
use serde::{Deserialize, Serialize};

use crate::enums::EventName;

/// Identity of a log on the ledger, stable across re-deliveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LogId {
    pub transaction_hash: H256,
    pub log_index: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogParams {
    /// Contribution credited to the sale by this event.
    pub accounted: U256,
}

/// A decoded `Buyin` or `Injected` log.
///
/// Arrives with only its block number; the timestamp is filled in once by the
/// normalizer and the log is not modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    pub contract_address: H160,
    pub event_name: EventName,
    pub block_number: u64,
    pub id: LogId,
    pub params: LogParams,
    pub timestamp: Option<DateTime<Utc>>,
}

impl EventLog {
    pub fn new(
        contract_address: H160,
        event_name: EventName,
        block_number: u64,
        id: LogId,
        accounted: U256,
    ) -> Self {
        Self {
            contract_address,
            event_name,
            block_number,
            id,
            params: LogParams { accounted },
            timestamp: None,
        }
    }

    /// Returns the log annotated with the wall-clock time of its block.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn accounted(&self) -> U256 {
        self.params.accounted
    }
}
