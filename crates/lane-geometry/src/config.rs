//! Line clustering configuration

use serde::{Deserialize, Serialize};

use crate::LaneError;

/// Line clustering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Segments at or below this absolute angle (degrees) are discarded
    pub min_abs_angle_deg: f32,

    /// Maximum angle difference (degrees) to join a cluster (exclusive)
    pub angle_threshold_deg: f32,

    /// Maximum bottom-point distance (pixels) to join a cluster (exclusive)
    pub distance_threshold_px: f32,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            min_abs_angle_deg: 50.0,
            angle_threshold_deg: 15.0,
            distance_threshold_px: 100.0,
        }
    }
}

impl ClusterConfig {
    /// Create tight config (more, narrower clusters)
    pub fn tight() -> Self {
        Self {
            angle_threshold_deg: 8.0,
            distance_threshold_px: 50.0,
            ..Default::default()
        }
    }

    /// Create loose config (fewer, wider clusters)
    pub fn loose() -> Self {
        Self {
            angle_threshold_deg: 25.0,
            distance_threshold_px: 160.0,
            ..Default::default()
        }
    }

    /// Check thresholds are usable
    pub fn validate(&self) -> Result<(), LaneError> {
        if !(0.0..90.0).contains(&self.min_abs_angle_deg) {
            return Err(LaneError::InvalidThreshold {
                name: "min_abs_angle_deg",
                value: self.min_abs_angle_deg,
            });
        }
        if !(self.angle_threshold_deg > 0.0) {
            return Err(LaneError::InvalidThreshold {
                name: "angle_threshold_deg",
                value: self.angle_threshold_deg,
            });
        }
        if !(self.distance_threshold_px > 0.0) {
            return Err(LaneError::InvalidThreshold {
                name: "distance_threshold_px",
                value: self.distance_threshold_px,
            });
        }
        Ok(())
    }
}
