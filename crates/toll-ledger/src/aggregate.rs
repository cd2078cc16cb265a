//! Report views derived from the history

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::history::HistoryRecord;

/// Pseudo vehicle type carrying a lane's total
pub const TOTAL_LABEL: &str = "TOTAL";

/// Per-lane vehicle counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneTally {
    pub by_type: BTreeMap<String, usize>,
    pub total: usize,
}

impl LaneTally {
    /// Count for a vehicle type; [`TOTAL_LABEL`] gives the lane total
    pub fn count(&self, vehicle_type: &str) -> usize {
        if vehicle_type == TOTAL_LABEL {
            self.total
        } else {
            self.by_type.get(vehicle_type).copied().unwrap_or(0)
        }
    }
}

/// Row of the lane summary table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneSummaryRow {
    pub lane: u32,
    pub vehicle_type: String,
    pub count: usize,
}

/// Stateless views over a history snapshot
pub struct HistoryAggregator;

impl HistoryAggregator {
    pub fn counts_by_type(records: &[HistoryRecord]) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in records {
            *counts.entry(record.vehicle_type.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn counts_by_lane(records: &[HistoryRecord]) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for record in records {
            *counts.entry(record.lane).or_insert(0) += 1;
        }
        counts
    }

    pub fn counts_by_lane_and_type(records: &[HistoryRecord]) -> BTreeMap<u32, LaneTally> {
        let mut lanes: BTreeMap<u32, LaneTally> = BTreeMap::new();
        for record in records {
            let tally = lanes.entry(record.lane).or_default();
            *tally.by_type.entry(record.vehicle_type.clone()).or_insert(0) += 1;
            tally.total += 1;
        }
        lanes
    }

    pub fn total_fees(records: &[HistoryRecord]) -> u64 {
        records.iter().map(|r| r.toll_fee as u64).sum()
    }

    pub fn fees_by_lane(records: &[HistoryRecord]) -> BTreeMap<u32, u64> {
        let mut fees = BTreeMap::new();
        for record in records {
            *fees.entry(record.lane).or_insert(0) += record.toll_fee as u64;
        }
        fees
    }

    /// Lane summary table: ascending lanes, each lane's types in lexical
    /// order followed by its `TOTAL` row
    pub fn lane_summary(records: &[HistoryRecord]) -> Vec<LaneSummaryRow> {
        let mut rows = Vec::new();
        for (lane, tally) in Self::counts_by_lane_and_type(records) {
            for (vehicle_type, count) in tally.by_type {
                rows.push(LaneSummaryRow {
                    lane,
                    vehicle_type,
                    count,
                });
            }
            rows.push(LaneSummaryRow {
                lane,
                vehicle_type: TOTAL_LABEL.to_string(),
                count: tally.total,
            });
        }
        rows
    }
}
