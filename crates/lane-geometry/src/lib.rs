//! Lane Geometry
//!
//! Turns noisy line segments from a single reference frame into lane
//! boundaries, then partitions the frame width into numbered lanes:
//! - Segment normalization and orientation
//! - Greedy angle/distance clustering of lane dividers
//! - Ordered lane regions with point-to-lane lookup

pub mod cluster;
pub mod config;
pub mod lane_map;
pub mod segment;

pub use cluster::{GreedyLineClusterer, LineGrouping};
pub use config::ClusterConfig;
pub use lane_map::{LaneMap, LaneRegion, UNASSIGNED_LANE};
pub use segment::{LaneBoundary, LineSegment, Point};

use thiserror::Error;

/// Lane geometry error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LaneError {
    #[error("Invalid clustering threshold {name}: {value}")]
    InvalidThreshold { name: &'static str, value: f32 },

    #[error("Invalid frame width: {0}")]
    InvalidFrameWidth(f32),
}
