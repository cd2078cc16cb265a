//! Flushable snapshot of the toll history

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use toll_ledger::{History, HistoryAggregator, HistoryRecord, LaneSummaryRow};

/// History plus its derived summary tables, as written by sinks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TollReport {
    pub records: Vec<HistoryRecord>,
    pub lane_summary: Vec<LaneSummaryRow>,
    pub counts_by_type: BTreeMap<String, usize>,
    pub counts_by_lane: BTreeMap<u32, usize>,
    pub total_fees: u64,
    pub outstanding_fees: u64,
}

impl TollReport {
    pub fn from_history(history: &History) -> Self {
        let records = history.records();
        Self {
            records: records.to_vec(),
            lane_summary: HistoryAggregator::lane_summary(records),
            counts_by_type: HistoryAggregator::counts_by_type(records),
            counts_by_lane: HistoryAggregator::counts_by_lane(records),
            total_fees: HistoryAggregator::total_fees(records),
            outstanding_fees: history.outstanding_total(),
        }
    }
}
