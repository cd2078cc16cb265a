//! Lane divider clustering
//!
//! Raw segments from a line extractor are noisy: one painted divider
//! usually yields several overlapping segments, and crosswalks or shadows
//! add near-horizontal clutter. Clustering keeps one representative
//! segment per divider.

use tracing::{debug, info};

use crate::config::ClusterConfig;
use crate::segment::{LaneBoundary, LineSegment};

/// Strategy for grouping raw segments into lane dividers.
///
/// Implementations return one boundary per divider. Ordering of the
/// result is not significant; [`LaneMap`](crate::LaneMap) sorts it.
pub trait LineGrouping {
    fn cluster(&self, segments: &[LineSegment]) -> Vec<LaneBoundary>;
}

/// Single-pass greedy clusterer.
///
/// Each segment joins the first existing group whose founding member has
/// a similar angle and a nearby bottom point, otherwise it founds a new
/// group. O(segments x groups) and order dependent.
pub struct GreedyLineClusterer {
    config: ClusterConfig,
}

/// One divider candidate; `members[0]` is the representative
#[derive(Debug, Clone)]
pub struct SegmentGroup {
    pub members: Vec<LineSegment>,
    angle: f32,
}

impl SegmentGroup {
    fn new(segment: LineSegment, angle: f32) -> Self {
        Self {
            members: vec![segment],
            angle,
        }
    }

    pub fn representative(&self) -> &LineSegment {
        &self.members[0]
    }
}

impl GreedyLineClusterer {
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Whether a segment is steep enough to be a lane divider
    pub fn is_divider_candidate(&self, segment: &LineSegment) -> bool {
        segment.angle_degrees().abs() > self.config.min_abs_angle_deg
    }

    /// Group segments, keeping every member (groups in creation order)
    pub fn group(&self, segments: &[LineSegment]) -> Vec<SegmentGroup> {
        let mut groups: Vec<SegmentGroup> = Vec::new();
        let mut discarded = 0usize;

        for segment in segments {
            let angle = segment.angle_degrees();
            if angle.abs() <= self.config.min_abs_angle_deg {
                discarded += 1;
                continue;
            }

            let matched = groups.iter_mut().find(|group| {
                (angle - group.angle).abs() < self.config.angle_threshold_deg
                    && segment.bottom_distance(group.representative())
                        < self.config.distance_threshold_px
            });

            match matched {
                Some(group) => group.members.push(*segment),
                None => groups.push(SegmentGroup::new(*segment, angle)),
            }
        }

        debug!(
            "Clustered {} segments into {} groups ({} too shallow)",
            segments.len(),
            groups.len(),
            discarded
        );
        groups
    }
}

impl Default for GreedyLineClusterer {
    fn default() -> Self {
        Self::new(ClusterConfig::default())
    }
}

impl LineGrouping for GreedyLineClusterer {
    fn cluster(&self, segments: &[LineSegment]) -> Vec<LaneBoundary> {
        let boundaries: Vec<LaneBoundary> = self
            .group(segments)
            .iter()
            .map(|group| LaneBoundary::new(*group.representative()))
            .collect();

        if boundaries.is_empty() {
            info!("No lane dividers found among {} segments", segments.len());
        } else {
            info!("Found {} lane dividers", boundaries.len());
        }
        boundaries
    }
}
