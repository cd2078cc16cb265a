//! Toll fees and billing

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::history::{History, HistoryRecord, PaymentStatus, UpsertOutcome};
use crate::vehicle::{Departure, VehicleId};

/// Fixed fee schedule keyed on vehicle-type tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct TollSchedule;

impl TollSchedule {
    pub const FOUR_WHEEL_FEE: u32 = 30;
    pub const SIX_WHEEL_FEE: u32 = 75;
    pub const SIX_MORE_WHEEL_FEE: u32 = 120;

    /// Fee for a class label; anything unrecognized is free
    pub fn fee_for(&self, vehicle_type: &str) -> u32 {
        if vehicle_type.contains("4-wheel") {
            Self::FOUR_WHEEL_FEE
        } else if vehicle_type.contains("6-more-wheel") {
            Self::SIX_MORE_WHEEL_FEE
        } else if vehicle_type.contains("6-wheel") {
            Self::SIX_WHEEL_FEE
        } else {
            0
        }
    }
}

/// Outcome of billing one departure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingReceipt {
    pub id: VehicleId,
    pub vehicle_type: String,
    pub lane: u32,
    pub toll_fee: u32,
    /// False when an existing record was overwritten
    pub created: bool,
}

/// Turns qualifying departures into history records
#[derive(Debug, Clone, Default)]
pub struct TollAccountant {
    schedule: TollSchedule,
}

impl TollAccountant {
    pub fn new(schedule: TollSchedule) -> Self {
        Self { schedule }
    }

    pub fn schedule(&self) -> &TollSchedule {
        &self.schedule
    }

    /// Bill a departure. Re-billing an id overwrites its record and
    /// resets it to awaiting payment.
    pub fn bill(&self, history: &mut History, departure: &Departure) -> BillingReceipt {
        let toll_fee = self.schedule.fee_for(&departure.class_label);
        let outcome = history.upsert(HistoryRecord {
            id: departure.id,
            vehicle_type: departure.class_label.clone(),
            lane: departure.lane,
            timestamp_ms: departure.first_seen_ms,
            payment_status: PaymentStatus::AwaitingPayment,
            toll_fee,
        });

        debug!(
            "Billed vehicle {} ({}, lane {}): {}",
            departure.id, departure.class_label, departure.lane, toll_fee
        );

        BillingReceipt {
            id: departure.id,
            vehicle_type: departure.class_label.clone(),
            lane: departure.lane,
            toll_fee,
            created: outcome == UpsertOutcome::Created,
        }
    }
}
