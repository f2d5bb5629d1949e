//! Cumulative contribution series.
//!
//! The series only ever grows at the tail. Each merge orders its own batch by
//! time and accumulates from the last committed total; points already in the
//! series are never re-sorted or recomputed.

use chrono::{DateTime, Utc};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

use super::event_log::EventLog;
use crate::error::{SaleError, SaleResult};

/// One step of the cumulative series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub time: DateTime<Utc>,
    pub total_accounted: U256,
}

/// What a merge appended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Number of points appended, one per log.
    pub appended: usize,
    /// The batch's earliest log is older than the series tail it was appended after.
    pub out_of_order: bool,
}

/// Append-only cumulative series of accounted contributions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSeries {
    points: Vec<ChartPoint>,
}

impl ChartSeries {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[ChartPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Cumulative total of the last committed point, zero for an empty series.
    pub fn last_total(&self) -> U256 {
        self.points
            .last()
            .map(|p| p.total_accounted)
            .unwrap_or_default()
    }

    pub fn last_time(&self) -> Option<DateTime<Utc>> {
        self.points.last().map(|p| p.time)
    }

    /// Merges a batch of timestamped logs.
    ///
    /// The batch is stable-sorted by time, so logs sharing a timestamp keep
    /// their delivery order. Every log must already carry its timestamp; the
    /// series is left untouched if any does not or if the total would overflow.
    ///
    /// Merge is not idempotent: a log merged twice is counted twice.
    pub fn merge(&mut self, logs: Vec<EventLog>) -> SaleResult<MergeOutcome> {
        let mut timed = Vec::with_capacity(logs.len());
        for log in logs {
            let time = log.timestamp.ok_or_else(|| {
                SaleError::invalid(format!(
                    "log {:?} in block {} has no timestamp",
                    log.id, log.block_number
                ))
            })?;
            timed.push((time, log.accounted()));
        }
        timed.sort_by_key(|(time, _)| *time);

        let out_of_order = match (self.last_time(), timed.first()) {
            (Some(tail), Some((first, _))) => *first < tail,
            _ => false,
        };

        let mut total = self.last_total();
        let mut points = Vec::with_capacity(timed.len());
        for (time, accounted) in timed {
            total = total
                .checked_add(accounted)
                .ok_or_else(|| SaleError::invalid("accounted total overflows 256 bits"))?;
            points.push(ChartPoint {
                time,
                total_accounted: total,
            });
        }

        let appended = points.len();
        self.points.extend(points);

        Ok(MergeOutcome {
            appended,
            out_of_order,
        })
    }
}
