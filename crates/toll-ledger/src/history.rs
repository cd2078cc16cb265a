//! Billing history
//!
//! At most one record per vehicle id. Billing an id again overwrites its
//! record in place, so record order is the order vehicles were first
//! billed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::vehicle::VehicleId;
use crate::LedgerError;

/// Payment state of a toll record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[default]
    #[serde(rename = "awaiting payment")]
    AwaitingPayment,
    #[serde(rename = "paid")]
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::AwaitingPayment => "awaiting payment",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One billed vehicle. Field order is the export column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: VehicleId,
    pub vehicle_type: String,
    pub lane: u32,
    /// First-seen frame timestamp (ms)
    pub timestamp_ms: u64,
    pub payment_status: PaymentStatus,
    pub toll_fee: u32,
}

/// Whether an upsert added or replaced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Ordered, id-keyed toll history
#[derive(Debug, Clone, Default)]
pub struct History {
    records: Vec<HistoryRecord>,
    index: HashMap<VehicleId, usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, or overwrite the one with the same id
    pub fn upsert(&mut self, record: HistoryRecord) -> UpsertOutcome {
        match self.index.get(&record.id) {
            Some(&pos) => {
                debug!("Updating history record for vehicle {}", record.id);
                self.records[pos] = record;
                UpsertOutcome::Updated
            }
            None => {
                self.index.insert(record.id, self.records.len());
                self.records.push(record);
                UpsertOutcome::Created
            }
        }
    }

    /// Record a payment for a billed vehicle
    pub fn mark_paid(&mut self, id: VehicleId) -> Result<(), LedgerError> {
        let pos = *self.index.get(&id).ok_or(LedgerError::UnknownVehicle(id))?;
        self.records[pos].payment_status = PaymentStatus::Paid;
        info!("Vehicle {} marked as paid", id);
        Ok(())
    }

    pub fn get(&self, id: VehicleId) -> Option<&HistoryRecord> {
        self.index.get(&id).map(|&pos| &self.records[pos])
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of fees not yet paid
    pub fn outstanding_total(&self) -> u64 {
        self.records
            .iter()
            .filter(|r| r.payment_status == PaymentStatus::AwaitingPayment)
            .map(|r| r.toll_fee as u64)
            .sum()
    }
}
