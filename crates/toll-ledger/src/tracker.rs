//! Identity tracker seam
//!
//! Re-identification is not done here. The ledger only needs boxes with
//! ids that stay stable for one physical object across frames.

use std::collections::VecDeque;

use crate::detection::{TrackedBox, TrackerDetection};
use crate::LedgerError;

/// Multi-object tracker assigning persistent ids
pub trait IdentityTracker {
    /// Feed one frame of detections, get back tracked boxes
    fn update(&mut self, detections: &[TrackerDetection]) -> Result<Vec<TrackedBox>, LedgerError>;
}

/// Tracker that replays a fixed sequence of per-frame outputs.
///
/// Detections are ignored. Once the script runs out every later frame
/// reports no tracks, which ends all remaining tracks.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTracker {
    frames: VecDeque<Vec<TrackedBox>>,
}

impl ScriptedTracker {
    pub fn new(frames: impl IntoIterator<Item = Vec<TrackedBox>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// Frames left in the script
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl IdentityTracker for ScriptedTracker {
    fn update(&mut self, _detections: &[TrackerDetection]) -> Result<Vec<TrackedBox>, LedgerError> {
        Ok(self.frames.pop_front().unwrap_or_default())
    }
}
