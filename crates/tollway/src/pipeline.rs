//! Frame-synchronous toll pipeline
//!
//! Each frame is fully processed (detect, track, reconcile, bill) before
//! the next is pulled from the source. A stop request is honored only
//! between frames.

use std::sync::atomic::{AtomicBool, Ordering};

use frame_source::{FrameSource, VideoFrame};
use lane_geometry::{GreedyLineClusterer, LaneMap, LineGrouping};
use storage::{HistorySink, StorageError, TollReport};
use toll_ledger::{
    BillingReceipt, FrameOutcome, IdentityTracker, TollSession, TrackedBox, TrackerDetection,
};
use tracing::{debug, error, info, warn};

use crate::adapter::DetectionAdapter;
use crate::collaborators::{Collaborators, ObjectDetector};
use crate::config::AppConfig;
use crate::PipelineError;

/// What happened in one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub sequence: u32,
    pub timestamp_ms: u64,
    pub detections: usize,
    pub active_vehicles: usize,
    pub billed: Vec<BillingReceipt>,
}

/// Totals for a `run` call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub billed: usize,
    /// Stopped by request rather than end of stream
    pub stopped: bool,
}

pub struct Pipeline {
    source: Box<dyn FrameSource + Send>,
    detector: Box<dyn ObjectDetector + Send>,
    tracker: Box<dyn IdentityTracker + Send>,
    adapter: DetectionAdapter,
    session: TollSession,
    roi_start_ratio: f32,
    frames_processed: u64,
    last_timestamp_ms: u64,
}

impl Pipeline {
    /// Pull the reference frame, infer lanes from it, and get ready for
    /// the frame loop. The reference frame itself is not accounted.
    pub fn new(config: &AppConfig, collaborators: Collaborators) -> Result<Self, PipelineError> {
        Self::with_grouping(
            config,
            collaborators,
            &GreedyLineClusterer::new(config.clustering.clone()),
        )
    }

    /// Same as [`Pipeline::new`] with a custom divider grouping strategy
    pub fn with_grouping(
        config: &AppConfig,
        collaborators: Collaborators,
        grouping: &dyn LineGrouping,
    ) -> Result<Self, PipelineError> {
        config.validate()?;

        let Collaborators {
            mut source,
            mut extractor,
            detector,
            tracker,
        } = collaborators;

        let reference = source.next_frame()?.ok_or(PipelineError::NoReferenceFrame)?;
        let segments = extractor.extract(&reference)?;
        let boundaries = grouping.cluster(&segments);
        let lane_map = LaneMap::new(boundaries, reference.width as f32)?;
        if lane_map.is_single_lane() {
            warn!("No lane dividers detected, treating the road as one lane");
        }

        let mut ledger_config = config.ledger.clone();
        if config.detector.zone_starts_at_roi {
            let roi = reference.region_below(config.detector.roi_start_ratio)?;
            ledger_config.zone_start_y = roi.offset_y as f32;
        }
        info!(
            "Pipeline ready: {} lanes, billing line at y={}",
            lane_map.lane_count(),
            ledger_config.crossing_line_y()
        );

        Ok(Self {
            source,
            detector,
            tracker,
            adapter: DetectionAdapter::new(&config.detector),
            session: TollSession::new(lane_map, ledger_config),
            roi_start_ratio: config.detector.roi_start_ratio,
            frames_processed: 0,
            last_timestamp_ms: reference.timestamp_ms,
        })
    }

    /// Process one frame to completion
    pub fn step(&mut self, frame: &VideoFrame) -> Result<FrameReport, PipelineError> {
        let roi = frame.region_below(self.roi_start_ratio)?;
        let raw = self.detector.detect(&roi)?;
        let detections = self
            .adapter
            .adapt(&raw, roi.offset_y, frame.width, frame.height);

        let tracker_input: Vec<TrackerDetection> =
            detections.iter().map(TrackerDetection::from).collect();
        let tracks = clamp_tracks(self.tracker.update(&tracker_input)?, frame.width, frame.height);

        let outcome = self
            .session
            .process_frame(frame.timestamp_ms, &tracks, &detections);

        self.frames_processed += 1;
        self.last_timestamp_ms = frame.timestamp_ms;
        metrics::counter!("tollway_frames_processed_total").increment(1);
        record_outcome(&outcome);

        debug!(
            "Frame {}: {} detections, {} tracks, {} billed",
            frame.sequence,
            detections.len(),
            tracks.len(),
            outcome.billed.len()
        );

        Ok(FrameReport {
            sequence: frame.sequence,
            timestamp_ms: frame.timestamp_ms,
            detections: detections.len(),
            active_vehicles: outcome.active,
            billed: outcome.billed,
        })
    }

    /// Run until the source is exhausted or `stop` is set.
    ///
    /// At end of stream every still-active vehicle is treated as departed.
    /// On a stop request active vehicles are left as they are.
    pub fn run(&mut self, stop: &AtomicBool) -> Result<RunSummary, PipelineError> {
        let mut summary = RunSummary::default();

        loop {
            if stop.load(Ordering::SeqCst) {
                info!("Stop requested, halting after frame {}", summary.frames);
                summary.stopped = true;
                break;
            }

            let Some(frame) = self.source.next_frame()? else {
                let outcome = self.session.finish(self.last_timestamp_ms);
                record_outcome(&outcome);
                summary.billed += outcome.billed.len();
                info!("End of stream after {} frames", summary.frames);
                break;
            };

            let report = self.step(&frame)?;
            summary.frames += 1;
            summary.billed += report.billed.len();
        }

        Ok(summary)
    }

    /// Write history and summary tables to `sink`.
    ///
    /// The in-memory history is kept whatever the sink does.
    pub fn flush(&self, sink: &dyn HistorySink) -> Result<(), StorageError> {
        let report = TollReport::from_history(self.session.history());
        sink.write(&report).map_err(|e| {
            warn!("History flush failed: {}", e);
            e
        })
    }

    /// Run, then flush whatever was billed even if the run failed.
    ///
    /// A run error is returned after the flush. A flush error is returned
    /// only when the run itself succeeded.
    pub fn run_and_flush(
        &mut self,
        stop: &AtomicBool,
        sink: &dyn HistorySink,
    ) -> Result<RunSummary, PipelineError> {
        let run = self.run(stop);
        if let Err(e) = &run {
            error!(
                "Run aborted after {} frames, flushing {} records: {}",
                self.frames_processed,
                self.session.history().len(),
                e
            );
        }

        let flushed = self.flush(sink);
        let summary = run?;
        flushed?;
        Ok(summary)
    }

    pub fn session(&self) -> &TollSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut TollSession {
        &mut self.session
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }
}

/// Clamp tracker boxes to the frame. A box with nothing left inside the
/// frame is dropped, so its vehicle departs.
fn clamp_tracks(tracks: Vec<TrackedBox>, frame_width: u32, frame_height: u32) -> Vec<TrackedBox> {
    tracks
        .into_iter()
        .filter_map(|track| match track.bbox.sanitize(frame_width as f32, frame_height as f32) {
            Some(bbox) => Some(TrackedBox::new(track.id, bbox)),
            None => {
                debug!("Dropping out-of-frame track {} at {:?}", track.id, track.bbox);
                None
            }
        })
        .collect()
}

fn record_outcome(outcome: &FrameOutcome) {
    metrics::gauge!("tollway_active_vehicles").set(outcome.active as f64);
    metrics::counter!("tollway_departures_discarded_total").increment(outcome.discarded as u64);
    metrics::counter!("tollway_vehicles_billed_total").increment(outcome.billed.len() as u64);
    let fees: u64 = outcome.billed.iter().map(|r| r.toll_fee as u64).sum();
    metrics::counter!("tollway_toll_fees_total").increment(fees);
}
