//! Ledger configuration

use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// Vehicle ledger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Max distance (px) between a track center and a detection center
    /// for the detection's class to be adopted
    pub class_match_radius_px: f32,

    /// Vertical pixel where the detection zone starts
    pub zone_start_y: f32,

    /// Distance (px) the bbox bottom must reach past the zone start
    pub min_travel_px: f32,

    /// Labels containing any of these tokens are never billed
    pub excluded_labels: Vec<String>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            class_match_radius_px: 50.0,
            zone_start_y: 360.0, // 1080p frame, top third excluded
            min_travel_px: 150.0,
            excluded_labels: vec!["2-wheel".to_string()],
        }
    }
}

impl LedgerConfig {
    /// Line the bbox bottom edge must reach to count as crossed
    pub fn crossing_line_y(&self) -> f32 {
        self.zone_start_y + self.min_travel_px
    }

    pub fn is_excluded(&self, label: &str) -> bool {
        self.excluded_labels
            .iter()
            .any(|token| label.contains(token.as_str()))
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        if !(self.class_match_radius_px > 0.0) {
            return Err(LedgerError::Config(format!(
                "class_match_radius_px must be positive, got {}",
                self.class_match_radius_px
            )));
        }
        if !(self.min_travel_px >= 0.0) {
            return Err(LedgerError::Config(format!(
                "min_travel_px must not be negative, got {}",
                self.min_travel_px
            )));
        }
        if !self.zone_start_y.is_finite() {
            return Err(LedgerError::Config("zone_start_y must be finite".to_string()));
        }
        Ok(())
    }
}
