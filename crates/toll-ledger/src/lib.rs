//! Toll Ledger
//!
//! Frame-by-frame vehicle accounting for a tolled road section:
//! - Reconciles tracker output into persistent vehicle records
//! - Detects detection-zone crossing and track departure
//! - Bills qualifying departures against a fixed fee schedule
//! - Keeps a deduplicated history with derived lane/type reports

pub mod aggregate;
pub mod config;
pub mod detection;
pub mod history;
pub mod ledger;
pub mod session;
pub mod toll;
pub mod tracker;
pub mod vehicle;

pub use aggregate::{HistoryAggregator, LaneSummaryRow, LaneTally, TOTAL_LABEL};
pub use config::LedgerConfig;
pub use detection::{BoundingBox, ClassDetection, TrackedBox, TrackerDetection};
pub use history::{History, HistoryRecord, PaymentStatus, UpsertOutcome};
pub use ledger::{DiscardReason, LedgerUpdate, VehicleLedger};
pub use session::{FrameOutcome, TollSession};
pub use toll::{BillingReceipt, TollAccountant, TollSchedule};
pub use tracker::{IdentityTracker, ScriptedTracker};
pub use vehicle::{Departure, TrackedVehicle, VehicleId, UNKNOWN_LABEL};

use thiserror::Error;

/// Ledger error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("No history record for vehicle {0}")]
    UnknownVehicle(VehicleId),

    #[error("Invalid ledger configuration: {0}")]
    Config(String),

    #[error("Tracker failure: {0}")]
    Tracker(String),
}
