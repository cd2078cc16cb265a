//! Tollway Pipeline
//!
//! Wires the external collaborators (frame source, line extractor,
//! object detector, identity tracker) to lane inference and toll
//! accounting:
//! - Lanes are inferred once from the reference frame
//! - Every later frame is detected, tracked and reconciled in order
//! - History is flushed to a sink only on request

pub mod adapter;
pub mod collaborators;
pub mod config;
pub mod logging;
pub mod pipeline;
pub mod replay;

pub use adapter::DetectionAdapter;
pub use collaborators::{Collaborators, ObjectDetector, RawDetection, SegmentExtractor};
pub use config::{AppConfig, DetectorConfig, LoggingConfig, OutputConfig, OutputFormat};
pub use logging::init_logging;
pub use pipeline::{FrameReport, Pipeline, RunSummary};
pub use replay::ReplayScript;

use thiserror::Error;

/// Pipeline error types
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Frame source error: {0}")]
    Frame(#[from] frame_source::FrameError),

    #[error("Lane geometry error: {0}")]
    Lane(#[from] lane_geometry::LaneError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] toll_ledger::LedgerError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Collaborator failure: {0}")]
    Collaborator(String),

    #[error("Replay script error: {0}")]
    Replay(String),

    #[error("Frame source produced no reference frame")]
    NoReferenceFrame,
}

impl From<::config::ConfigError> for PipelineError {
    fn from(err: ::config::ConfigError) -> Self {
        PipelineError::Config(err.to_string())
    }
}
