use serde::{Deserialize, Serialize};
use std::fmt;

/// Sale contract events that move the accounted total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
    Buyin,
    Injected,
}

impl EventName {
    /// Both events tracked by the chart.
    pub const CHART: [EventName; 2] = [EventName::Buyin, EventName::Injected];

    /// Canonical Solidity signature, input of the topic hash.
    pub fn signature(&self) -> &'static str {
        match self {
            EventName::Buyin => "Buyin(address,uint256,uint256,uint256)",
            EventName::Injected => "Injected(address,uint256,uint256)",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::Buyin => "Buyin",
            EventName::Injected => "Injected",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
