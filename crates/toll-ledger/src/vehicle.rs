//! Tracked vehicle state

use serde::{Deserialize, Serialize};

/// Track id assigned by the external tracker
pub type VehicleId = u64;

/// Label used until the classifier has matched a track
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Vehicle state while its track is active
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedVehicle {
    pub id: VehicleId,

    /// Last matched class label, or [`UNKNOWN_LABEL`]
    pub class_label: String,

    /// Lane of the latest bbox center (0 = unassigned)
    pub lane: u32,

    /// Frame timestamp of the first sighting (ms)
    pub first_seen_ms: u64,

    /// Frame timestamp of the latest sighting (ms)
    pub last_seen_ms: u64,

    /// Latched once the vehicle has travelled far enough into the zone
    pub threshold_crossed: bool,

    /// Number of frames this track was reported
    pub frames_seen: u32,
}

impl TrackedVehicle {
    pub fn is_labelled(&self) -> bool {
        self.class_label != UNKNOWN_LABEL
    }
}

/// A crossed vehicle whose track has ended, ready for billing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Departure {
    pub id: VehicleId,
    pub class_label: String,
    pub lane: u32,
    pub first_seen_ms: u64,
}

impl From<&TrackedVehicle> for Departure {
    fn from(vehicle: &TrackedVehicle) -> Self {
        Self {
            id: vehicle.id,
            class_label: vehicle.class_label.clone(),
            lane: vehicle.lane,
            first_seen_ms: vehicle.first_seen_ms,
        }
    }
}
