//! Detector output to ledger input

use toll_ledger::{ClassDetection, UNKNOWN_LABEL};
use tracing::debug;

use crate::collaborators::RawDetection;
use crate::config::DetectorConfig;

/// Filters, translates and labels raw detections.
///
/// Boxes are moved from region to frame coordinates, then clamped to the
/// frame; boxes with no area left are dropped.
pub struct DetectionAdapter {
    min_confidence: f32,
    class_names: Vec<String>,
}

impl DetectionAdapter {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            min_confidence: config.min_confidence,
            class_names: config.class_names.clone(),
        }
    }

    /// Confidence rounded up to two decimals
    pub fn round_confidence(confidence: f32) -> f32 {
        (confidence * 100.0).ceil() / 100.0
    }

    pub fn label_for(&self, class_index: usize) -> &str {
        self.class_names
            .get(class_index)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_LABEL)
    }

    pub fn adapt(
        &self,
        raw: &[RawDetection],
        offset_y: u32,
        frame_width: u32,
        frame_height: u32,
    ) -> Vec<ClassDetection> {
        raw.iter()
            .filter_map(|detection| {
                let confidence = Self::round_confidence(detection.confidence);
                if confidence <= self.min_confidence {
                    return None;
                }

                let bbox = detection
                    .bbox
                    .offset_y(offset_y as f32)
                    .sanitize(frame_width as f32, frame_height as f32);
                let Some(bbox) = bbox else {
                    debug!("Dropping degenerate detection {:?}", detection.bbox);
                    return None;
                };

                Some(ClassDetection {
                    bbox,
                    label: self.label_for(detection.class_index).to_string(),
                    confidence,
                })
            })
            .collect()
    }
}
