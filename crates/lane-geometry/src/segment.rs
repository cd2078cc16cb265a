//! Line segments and lane boundaries

use serde::{Deserialize, Serialize};

/// Image-space point (pixels, y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Line segment normalized bottom-first.
///
/// `bottom` is always the endpoint with the larger vertical coordinate,
/// i.e. the one closer to the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub bottom: Point,
    pub top: Point,
}

impl LineSegment {
    /// Build a segment from raw extractor output, reordering endpoints
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        if y1 < y2 {
            Self {
                bottom: Point::new(x2, y2),
                top: Point::new(x1, y1),
            }
        } else {
            Self {
                bottom: Point::new(x1, y1),
                top: Point::new(x2, y2),
            }
        }
    }

    /// Build from the `[x1, y1, x2, y2]` layout used by line extractors
    pub fn from_coords(coords: [f32; 4]) -> Self {
        Self::new(coords[0], coords[1], coords[2], coords[3])
    }

    /// Orientation in degrees, arctangent of the slope.
    ///
    /// Vertical segments are exactly 90°. Result lies in (-90, 90].
    pub fn angle_degrees(&self) -> f32 {
        let dx = self.top.x - self.bottom.x;
        if dx == 0.0 {
            return 90.0;
        }
        let dy = self.top.y - self.bottom.y;
        (dy / dx).atan().to_degrees()
    }

    /// Distance between the bottom points of two segments
    pub fn bottom_distance(&self, other: &LineSegment) -> f32 {
        self.bottom.distance(&other.bottom)
    }
}

/// Representative segment of one divider cluster
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneBoundary {
    pub segment: LineSegment,
}

impl LaneBoundary {
    pub fn new(segment: LineSegment) -> Self {
        Self { segment }
    }

    /// Horizontal position used to order boundaries and split lanes
    pub fn x(&self) -> f32 {
        self.segment.bottom.x
    }
}

impl From<LineSegment> for LaneBoundary {
    fn from(segment: LineSegment) -> Self {
        Self::new(segment)
    }
}
