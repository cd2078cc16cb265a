//! Per-frame detection and track types

use lane_geometry::Point;
use serde::{Deserialize, Serialize};

use crate::vehicle::VehicleId;

/// Axis-aligned box in frame pixels, corners `(x1, y1)`-`(x2, y2)`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn center(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Bottom edge (largest y)
    pub fn bottom(&self) -> f32 {
        self.y2
    }

    /// Shift vertically, e.g. from region-of-interest to frame coordinates
    pub fn offset_y(&self, dy: f32) -> Self {
        Self {
            y1: self.y1 + dy,
            y2: self.y2 + dy,
            ..*self
        }
    }

    /// Reorder corners and clamp to `[0, width] x [0, height]`.
    ///
    /// Returns `None` if nothing with positive area is left.
    pub fn sanitize(&self, frame_width: f32, frame_height: f32) -> Option<Self> {
        let clamp_x = |v: f32| v.clamp(0.0, frame_width);
        let clamp_y = |v: f32| v.clamp(0.0, frame_height);

        if ![self.x1, self.y1, self.x2, self.y2].iter().all(|v| v.is_finite()) {
            return None;
        }

        let sanitized = Self {
            x1: clamp_x(self.x1.min(self.x2)),
            y1: clamp_y(self.y1.min(self.y2)),
            x2: clamp_x(self.x1.max(self.x2)),
            y2: clamp_y(self.y1.max(self.y2)),
        };

        if sanitized.width() > 0.0 && sanitized.height() > 0.0 {
            Some(sanitized)
        } else {
            None
        }
    }
}

/// Classifier output, already confidence filtered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDetection {
    pub bbox: BoundingBox,
    pub label: String,
    pub confidence: f32,
}

/// Class-agnostic detection handed to the identity tracker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackerDetection {
    pub bbox: BoundingBox,
    pub confidence: f32,
}

impl From<&ClassDetection> for TrackerDetection {
    fn from(detection: &ClassDetection) -> Self {
        Self {
            bbox: detection.bbox,
            confidence: detection.confidence,
        }
    }
}

/// Tracker output: a box with an id stable across frames
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackedBox {
    pub id: VehicleId,
    pub bbox: BoundingBox,
}

impl TrackedBox {
    pub fn new(id: VehicleId, bbox: BoundingBox) -> Self {
        Self { id, bbox }
    }
}
