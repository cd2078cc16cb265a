//! Lane regions and point-to-lane lookup

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::segment::LaneBoundary;
use crate::LaneError;

/// Lane number returned when a point falls outside every region
pub const UNASSIGNED_LANE: u32 = 0;

/// Contiguous horizontal interval of the frame.
///
/// `None` edges stand for the frame's left or right edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneRegion {
    /// Lane number, starting at 1 on the left
    pub index: u32,
    pub left_x: Option<f32>,
    pub right_x: Option<f32>,
}

impl LaneRegion {
    /// Resolve edges against the frame, `(left, right)`
    pub fn span(&self, frame_width: f32) -> (f32, f32) {
        (
            self.left_x.unwrap_or(0.0),
            self.right_x.unwrap_or(frame_width),
        )
    }

    /// Inclusive on both sides
    pub fn contains(&self, x: f32, frame_width: f32) -> bool {
        let (left, right) = self.span(frame_width);
        left <= x && x <= right
    }

    pub fn center_x(&self, frame_width: f32) -> f32 {
        let (left, right) = self.span(frame_width);
        (left + right) / 2.0
    }
}

/// Ordered partition of the frame width into lanes.
///
/// Built once from the reference frame and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneMap {
    boundaries: Vec<LaneBoundary>,
    regions: Vec<LaneRegion>,
    frame_width: f32,
}

impl LaneMap {
    /// Build lanes from boundaries in any order.
    ///
    /// With N boundaries the map has N + 1 regions. No boundaries gives a
    /// single lane spanning the whole frame.
    pub fn new(mut boundaries: Vec<LaneBoundary>, frame_width: f32) -> Result<Self, LaneError> {
        if !(frame_width > 0.0) || !frame_width.is_finite() {
            return Err(LaneError::InvalidFrameWidth(frame_width));
        }

        boundaries.sort_by(|a, b| a.x().total_cmp(&b.x()));

        let mut regions = Vec::with_capacity(boundaries.len() + 1);
        let mut left_x = None;
        for (i, boundary) in boundaries.iter().enumerate() {
            regions.push(LaneRegion {
                index: i as u32 + 1,
                left_x,
                right_x: Some(boundary.x()),
            });
            left_x = Some(boundary.x());
        }
        regions.push(LaneRegion {
            index: boundaries.len() as u32 + 1,
            left_x,
            right_x: None,
        });

        info!(
            "Lane map built: {} lanes across {}px",
            regions.len(),
            frame_width
        );

        Ok(Self {
            boundaries,
            regions,
            frame_width,
        })
    }

    /// Lane containing `x`, or [`UNASSIGNED_LANE`].
    ///
    /// A point exactly on a boundary belongs to the lane on its left.
    pub fn lane_of(&self, x: f32) -> u32 {
        self.regions
            .iter()
            .find(|region| region.contains(x, self.frame_width))
            .map(|region| region.index)
            .unwrap_or(UNASSIGNED_LANE)
    }

    pub fn regions(&self) -> &[LaneRegion] {
        &self.regions
    }

    /// Boundaries sorted by bottom-point x
    pub fn boundaries(&self) -> &[LaneBoundary] {
        &self.boundaries
    }

    pub fn lane_count(&self) -> usize {
        self.regions.len()
    }

    pub fn frame_width(&self) -> f32 {
        self.frame_width
    }

    /// True when no dividers were found
    pub fn is_single_lane(&self) -> bool {
        self.boundaries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::LineSegment;
    use proptest::prelude::*;

    fn boundary_at(x: f32) -> LaneBoundary {
        LaneBoundary::new(LineSegment::new(x, 1000.0, x + 50.0, 300.0))
    }

    #[test]
    fn test_empty_boundaries_single_lane() {
        let map = LaneMap::new(vec![], 1280.0).unwrap();
        assert!(map.is_single_lane());
        assert_eq!(map.lane_count(), 1);
        assert_eq!(
            map.regions()[0],
            LaneRegion {
                index: 1,
                left_x: None,
                right_x: None
            }
        );
        assert_eq!(map.lane_of(0.0), 1);
        assert_eq!(map.lane_of(640.0), 1);
        assert_eq!(map.lane_of(1280.0), 1);
    }

    #[test]
    fn test_boundaries_sorted_into_regions() {
        let map = LaneMap::new(vec![boundary_at(1200.0), boundary_at(400.0)], 1920.0).unwrap();

        assert_eq!(map.boundaries()[0].x(), 400.0);
        let regions = map.regions();
        assert_eq!(regions.len(), 3);
        assert_eq!(regions[0].span(1920.0), (0.0, 400.0));
        assert_eq!(regions[1].span(1920.0), (400.0, 1200.0));
        assert_eq!(regions[2].span(1920.0), (1200.0, 1920.0));
        assert_eq!(regions[0].left_x, None);
        assert_eq!(regions[2].right_x, None);
    }

    #[test]
    fn test_lane_lookup() {
        let map = LaneMap::new(vec![boundary_at(400.0), boundary_at(1200.0)], 1920.0).unwrap();
        assert_eq!(map.lane_of(10.0), 1);
        assert_eq!(map.lane_of(800.0), 2);
        assert_eq!(map.lane_of(1919.0), 3);
    }

    #[test]
    fn test_boundary_point_resolves_left() {
        let map = LaneMap::new(vec![boundary_at(400.0), boundary_at(1200.0)], 1920.0).unwrap();
        assert_eq!(map.lane_of(400.0), 1);
        assert_eq!(map.lane_of(1200.0), 2);
    }

    #[test]
    fn test_outside_frame_unassigned() {
        let map = LaneMap::new(vec![boundary_at(400.0)], 1920.0).unwrap();
        assert_eq!(map.lane_of(-5.0), UNASSIGNED_LANE);
        assert_eq!(map.lane_of(2000.0), UNASSIGNED_LANE);
        assert_eq!(map.lane_of(f32::NAN), UNASSIGNED_LANE);
    }

    #[test]
    fn test_invalid_frame_width() {
        assert_eq!(
            LaneMap::new(vec![], 0.0),
            Err(LaneError::InvalidFrameWidth(0.0))
        );
        assert!(LaneMap::new(vec![], f32::INFINITY).is_err());
    }

    #[test]
    fn test_region_center() {
        let map = LaneMap::new(vec![boundary_at(400.0)], 1200.0).unwrap();
        assert_eq!(map.regions()[0].center_x(1200.0), 200.0);
        assert_eq!(map.regions()[1].center_x(1200.0), 800.0);
    }

    proptest! {
        #[test]
        fn test_region_count_and_shared_edges(
            xs in proptest::collection::vec(1.0f32..1919.0, 0..12),
        ) {
            let boundaries: Vec<LaneBoundary> = xs.iter().map(|&x| boundary_at(x)).collect();
            let map = LaneMap::new(boundaries, 1920.0).unwrap();

            prop_assert_eq!(map.regions().len(), xs.len() + 1);
            for (i, pair) in map.regions().windows(2).enumerate() {
                prop_assert_eq!(pair[0].right_x, pair[1].left_x);
                prop_assert_eq!(pair[0].index as usize, i + 1);
            }
        }

        #[test]
        fn test_lane_of_total_over_frame(
            xs in proptest::collection::vec(1.0f32..1919.0, 0..12),
            probe in 0.0f32..1920.0,
        ) {
            let boundaries: Vec<LaneBoundary> = xs.iter().map(|&x| boundary_at(x)).collect();
            let map = LaneMap::new(boundaries, 1920.0).unwrap();

            let lane = map.lane_of(probe);
            prop_assert_ne!(lane, UNASSIGNED_LANE);
            prop_assert_eq!(lane, map.lane_of(probe));

            // Exact boundary hits resolve to the left-hand lane
            for (i, boundary) in map.boundaries().iter().enumerate() {
                let x = boundary.x();
                let leftmost = map.boundaries().iter().position(|b| b.x() == x).unwrap_or(i);
                prop_assert_eq!(map.lane_of(x), leftmost as u32 + 1);
            }
        }
    }
}
