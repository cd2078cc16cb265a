//! Frame Source
//!
//! Frame acquisition contract for the toll pipeline:
//! - `VideoFrame` with timing metadata and optional RGB payload
//! - Region-of-interest cropping with a known vertical offset
//! - `FrameSource` trait for sequential, blocking frame delivery

pub mod frame;
pub mod source;

pub use frame::{RegionOfInterest, VideoFrame};
pub use source::{FrameSource, MemoryFrameSource};

use thiserror::Error;

/// Frame source error types
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Decode failed at frame {sequence}: {reason}")]
    Decode { sequence: u32, reason: String },

    #[error("Invalid region of interest: start row {start} outside frame height {height}")]
    InvalidRegion { start: u32, height: u32 },
}
