//! Owned accounting state for one video stream

use std::collections::BTreeMap;

use lane_geometry::LaneMap;
use tracing::debug;

use crate::config::LedgerConfig;
use crate::detection::{ClassDetection, TrackedBox};
use crate::history::History;
use crate::ledger::VehicleLedger;
use crate::toll::{BillingReceipt, TollAccountant};
use crate::vehicle::{Departure, VehicleId};

/// Summary of one processed frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutcome {
    pub active: usize,
    pub billed: Vec<BillingReceipt>,
    pub discarded: usize,
}

/// Lane map, active vehicles and billing history, threaded through the
/// frame loop. Frames must be fed in order.
pub struct TollSession {
    lane_map: LaneMap,
    ledger: VehicleLedger,
    accountant: TollAccountant,
    history: History,
    /// Billed `(id, type)` per lane, in billing order
    departures: BTreeMap<u32, Vec<(VehicleId, String)>>,
}

impl TollSession {
    pub fn new(lane_map: LaneMap, config: LedgerConfig) -> Self {
        Self {
            lane_map,
            ledger: VehicleLedger::new(config),
            accountant: TollAccountant::default(),
            history: History::new(),
            departures: BTreeMap::new(),
        }
    }

    /// Reconcile a frame and bill every qualifying departure
    pub fn process_frame(
        &mut self,
        timestamp_ms: u64,
        tracks: &[TrackedBox],
        detections: &[ClassDetection],
    ) -> FrameOutcome {
        let update = self
            .ledger
            .update(timestamp_ms, tracks, detections, &self.lane_map);
        self.settle(update.qualifying.as_slice(), update.discarded.len())
    }

    /// End all active tracks, billing those that qualify
    pub fn finish(&mut self, timestamp_ms: u64) -> FrameOutcome {
        let update = self.ledger.drain(timestamp_ms, &self.lane_map);
        debug!("Session finished with {} departures", update.departed_count());
        self.settle(update.qualifying.as_slice(), update.discarded.len())
    }

    fn settle(&mut self, qualifying: &[Departure], discarded: usize) -> FrameOutcome {
        let mut billed = Vec::with_capacity(qualifying.len());
        for departure in qualifying {
            let receipt = self.accountant.bill(&mut self.history, departure);
            self.departures
                .entry(receipt.lane)
                .or_default()
                .push((receipt.id, receipt.vehicle_type.clone()));
            billed.push(receipt);
        }

        FrameOutcome {
            active: self.ledger.active_count(),
            billed,
            discarded,
        }
    }

    pub fn lane_map(&self) -> &LaneMap {
        &self.lane_map
    }

    pub fn ledger(&self) -> &VehicleLedger {
        &self.ledger
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// Billed vehicles grouped by lane, for departure boards
    pub fn departures_by_lane(&self) -> &BTreeMap<u32, Vec<(VehicleId, String)>> {
        &self.departures
    }
}
