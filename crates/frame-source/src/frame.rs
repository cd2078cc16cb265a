//! Video frame types

use serde::{Deserialize, Serialize};

use crate::FrameError;

/// Decoded RGB video frame.
///
/// `data` may be empty for metadata-only frames (replayed streams).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoFrame {
    /// RGB pixel data (width * height * 3), or empty
    #[serde(default, skip_serializing)]
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Capture timestamp (milliseconds since stream start)
    pub timestamp_ms: u64,
    /// Frame sequence number
    pub sequence: u32,
}

impl VideoFrame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, timestamp_ms: u64, sequence: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp_ms,
            sequence,
        }
    }

    /// Frame without pixel payload
    pub fn metadata_only(width: u32, height: u32, timestamp_ms: u64, sequence: u32) -> Self {
        Self::new(Vec::new(), width, height, timestamp_ms, sequence)
    }

    /// RGB payload size implied by the frame dimensions
    fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    pub fn has_pixels(&self) -> bool {
        !self.data.is_empty() && self.data.len() == self.expected_len()
    }

    /// Get pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height || !self.has_pixels() {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// Crop a region of the frame; metadata-only frames crop to
    /// metadata-only frames
    pub fn crop(&self, x: u32, y: u32, w: u32, h: u32) -> Option<VideoFrame> {
        if x as u64 + w as u64 > self.width as u64 || y as u64 + h as u64 > self.height as u64 {
            return None;
        }

        let mut cropped = Vec::new();
        if self.has_pixels() {
            let stride = self.width as usize * 3;
            cropped.reserve(w as usize * h as usize * 3);
            for row in y as usize..(y + h) as usize {
                let start = row * stride + x as usize * 3;
                cropped.extend_from_slice(&self.data[start..start + w as usize * 3]);
            }
        }

        Some(VideoFrame {
            data: cropped,
            width: w,
            height: h,
            timestamp_ms: self.timestamp_ms,
            sequence: self.sequence,
        })
    }

    /// Full-width band from `ratio * height` down to the bottom edge
    pub fn region_below(&self, ratio: f32) -> Result<RegionOfInterest, FrameError> {
        let start = (self.height as f32 * ratio).floor() as u32;
        if !(0.0..1.0).contains(&ratio) || start >= self.height {
            return Err(FrameError::InvalidRegion {
                start,
                height: self.height,
            });
        }

        let frame = self
            .crop(0, start, self.width, self.height - start)
            .ok_or(FrameError::InvalidRegion {
                start,
                height: self.height,
            })?;

        Ok(RegionOfInterest {
            frame,
            offset_y: start,
        })
    }
}

/// Sub-frame handed to a detector, with its position in the full frame
#[derive(Debug, Clone, PartialEq)]
pub struct RegionOfInterest {
    pub frame: VideoFrame,
    /// Row of the full frame where this region starts
    pub offset_y: u32,
}
