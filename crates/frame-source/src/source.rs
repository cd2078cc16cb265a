//! Sequential frame delivery

use std::collections::VecDeque;

use tracing::debug;

use crate::frame::VideoFrame;
use crate::FrameError;

/// Yields frames one time step at a time.
///
/// `next_frame` may block until the next frame is ready; `Ok(None)`
/// means the stream has ended.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, FrameError>;
}

/// Source backed by frames held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryFrameSource {
    frames: VecDeque<VideoFrame>,
    delivered: u32,
}

impl MemoryFrameSource {
    pub fn new(frames: impl IntoIterator<Item = VideoFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            delivered: 0,
        }
    }

    pub fn delivered(&self) -> u32 {
        self.delivered
    }
}

impl FrameSource for MemoryFrameSource {
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, FrameError> {
        let frame = self.frames.pop_front();
        if let Some(frame) = &frame {
            self.delivered += 1;
            debug!("Delivering frame {}", frame.sequence);
        }
        Ok(frame)
    }
}
