pub mod chart;
pub mod event_log;
pub mod transaction;

pub use chart::{ChartPoint, ChartSeries, MergeOutcome};
pub use event_log::{EventLog, LogId, LogParams};
pub use transaction::{PurchaseTransaction, SignedTransaction};
