//! External collaborator contracts
//!
//! Line extraction, object detection and identity tracking are supplied
//! from outside; the pipeline only fixes their inputs and outputs.

use frame_source::{FrameSource, RegionOfInterest, VideoFrame};
use lane_geometry::LineSegment;
use serde::{Deserialize, Serialize};
use toll_ledger::{BoundingBox, IdentityTracker};

use crate::PipelineError;

/// Extracts raw line segments from one reference frame
pub trait SegmentExtractor {
    fn extract(&mut self, frame: &VideoFrame) -> Result<Vec<LineSegment>, PipelineError>;
}

/// Object detector output in region-local coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub bbox: BoundingBox,
    pub class_index: usize,
    pub confidence: f32,
}

/// Classifies objects in a region of interest
pub trait ObjectDetector {
    fn detect(&mut self, region: &RegionOfInterest) -> Result<Vec<RawDetection>, PipelineError>;
}

/// Everything the pipeline consumes from outside
pub struct Collaborators {
    pub source: Box<dyn FrameSource + Send>,
    pub extractor: Box<dyn SegmentExtractor + Send>,
    pub detector: Box<dyn ObjectDetector + Send>,
    pub tracker: Box<dyn IdentityTracker + Send>,
}
