//! Recorded collaborator output
//!
//! A replay script holds what the external extractor, detector and
//! tracker produced for a recorded stream, so the pipeline can be run
//! end to end without them:
//!
//! ```json
//! {
//!   "frame_width": 1920, "frame_height": 1080, "frame_interval_ms": 40,
//!   "segments": [[640, 1080, 700, 400]],
//!   "frames": [
//!     { "detections": [{ "bbox": {"x1": 840, "y1": 100, "x2": 960, "y2": 180},
//!                        "class_index": 1, "confidence": 0.91 }],
//!       "tracks": [{ "id": 7, "bbox": {"x1": 840, "y1": 460, "x2": 960, "y2": 540} }] }
//!   ]
//! }
//! ```
//!
//! Detection boxes are region-local, track boxes are in frame
//! coordinates. The reference frame (sequence 0) is synthesized; script
//! frames get sequences from 1.

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::Path;

use frame_source::{FrameError, FrameSource, RegionOfInterest, VideoFrame};
use lane_geometry::LineSegment;
use serde::{Deserialize, Serialize};
use toll_ledger::{ScriptedTracker, TrackedBox};
use tracing::info;

use crate::collaborators::{Collaborators, ObjectDetector, RawDetection, SegmentExtractor};
use crate::PipelineError;

fn default_interval() -> u64 {
    40
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    /// Defaults to `sequence * frame_interval_ms`
    #[serde(default)]
    pub timestamp_ms: Option<u64>,
    #[serde(default)]
    pub detections: Vec<RawDetection>,
    #[serde(default)]
    pub tracks: Vec<TrackedBox>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    pub frame_width: u32,
    pub frame_height: u32,
    #[serde(default = "default_interval")]
    pub frame_interval_ms: u64,
    #[serde(default)]
    pub segments: Vec<[f32; 4]>,
    #[serde(default)]
    pub frames: Vec<ReplayFrame>,
}

impl ReplayScript {
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let text = fs::read_to_string(path)
            .map_err(|e| PipelineError::Replay(format!("{}: {}", path.display(), e)))?;
        let script = Self::from_json(&text)?;
        info!(
            "Loaded replay script {} ({} frames, {} segments)",
            path.display(),
            script.frames.len(),
            script.segments.len()
        );
        Ok(script)
    }

    pub fn from_json(text: &str) -> Result<Self, PipelineError> {
        let script: ReplayScript =
            serde_json::from_str(text).map_err(|e| PipelineError::Replay(e.to_string()))?;
        if script.frame_width == 0 || script.frame_height == 0 {
            return Err(PipelineError::Replay(format!(
                "frame size {}x{} is empty",
                script.frame_width, script.frame_height
            )));
        }
        Ok(script)
    }

    /// Split the script into the four collaborator roles
    pub fn into_collaborators(self) -> Collaborators {
        let mut frames = VecDeque::with_capacity(self.frames.len() + 1);
        frames.push_back(VideoFrame::metadata_only(
            self.frame_width,
            self.frame_height,
            0,
            0,
        ));

        let mut detections = HashMap::new();
        let mut tracks = Vec::with_capacity(self.frames.len());

        for (i, frame) in self.frames.into_iter().enumerate() {
            let sequence = i as u32 + 1;
            let timestamp_ms = frame
                .timestamp_ms
                .unwrap_or(sequence as u64 * self.frame_interval_ms);
            frames.push_back(VideoFrame::metadata_only(
                self.frame_width,
                self.frame_height,
                timestamp_ms,
                sequence,
            ));
            detections.insert(sequence, frame.detections);
            tracks.push(frame.tracks);
        }

        Collaborators {
            source: Box::new(ReplaySource { frames }),
            extractor: Box::new(ReplaySegments {
                segments: self.segments.iter().map(|c| LineSegment::from_coords(*c)).collect(),
            }),
            detector: Box::new(ReplayDetector { detections }),
            tracker: Box::new(ScriptedTracker::new(tracks)),
        }
    }
}

struct ReplaySource {
    frames: VecDeque<VideoFrame>,
}

impl FrameSource for ReplaySource {
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, FrameError> {
        Ok(self.frames.pop_front())
    }
}

struct ReplaySegments {
    segments: Vec<LineSegment>,
}

impl SegmentExtractor for ReplaySegments {
    fn extract(&mut self, _frame: &VideoFrame) -> Result<Vec<LineSegment>, PipelineError> {
        Ok(self.segments.clone())
    }
}

struct ReplayDetector {
    detections: HashMap<u32, Vec<RawDetection>>,
}

impl ObjectDetector for ReplayDetector {
    fn detect(&mut self, region: &RegionOfInterest) -> Result<Vec<RawDetection>, PipelineError> {
        Ok(self
            .detections
            .remove(&region.frame.sequence)
            .unwrap_or_default())
    }
}
