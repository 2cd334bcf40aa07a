//! Resolved segments and the aggregate state published to subscribers.

use serde::{Deserialize, Serialize};

use crate::polyline::Polyline;

/// A drive between two consecutive stops as returned by the routing service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSegment {
    #[serde(rename = "route")]
    pub polyline: Polyline,
    #[serde(rename = "duration")]
    pub duration_seconds: f64,
    #[serde(rename = "distance")]
    pub distance_meters: f64,
}

/// What is known about one segment of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentState {
    /// Not attempted yet in this run.
    Pending,
    Resolved(ResolvedSegment),
    /// Could not be resolved; no geometry, no duration, no distance.
    Failed,
}

impl SegmentState {
    pub fn resolved(&self) -> Option<&ResolvedSegment> {
        match self {
            SegmentState::Resolved(segment) => Some(segment),
            SegmentState::Pending | SegmentState::Failed => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, SegmentState::Pending)
    }

    pub fn duration_seconds(&self) -> Option<f64> {
        self.resolved().map(|segment| segment.duration_seconds)
    }

    pub fn distance_meters(&self) -> Option<f64> {
        self.resolved().map(|segment| segment.distance_meters)
    }
}

impl From<Option<ResolvedSegment>> for SegmentState {
    fn from(value: Option<ResolvedSegment>) -> Self {
        match value {
            Some(segment) => SegmentState::Resolved(segment),
            None => SegmentState::Failed,
        }
    }
}

/// Snapshot of a recompute run: one entry per consecutive waypoint pair.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregateState {
    pub segments: Vec<SegmentState>,
    /// Sum of the distances of resolved segments; failed and pending count as 0.
    pub total_distance_meters: f64,
}

impl AggregateState {
    /// All `segment_count` entries pending.
    pub fn pending(segment_count: usize) -> Self {
        Self {
            segments: vec![SegmentState::Pending; segment_count],
            total_distance_meters: 0.0,
        }
    }

    pub fn from_segments(segments: Vec<SegmentState>) -> Self {
        let total_distance_meters = segments.iter().filter_map(SegmentState::distance_meters).sum();
        Self {
            segments,
            total_distance_meters,
        }
    }

    pub(crate) fn set(&mut self, index: usize, state: SegmentState) {
        self.segments[index] = state;
        self.total_distance_meters = self.segments.iter().filter_map(SegmentState::distance_meters).sum();
    }

    /// Per-segment drive time to the next stop, in seconds.
    pub fn durations(&self) -> Vec<Option<f64>> {
        self.segments.iter().map(SegmentState::duration_seconds).collect()
    }

    pub fn distances(&self) -> Vec<Option<f64>> {
        self.segments.iter().map(SegmentState::distance_meters).collect()
    }

    pub fn is_complete(&self) -> bool {
        !self.segments.iter().any(SegmentState::is_pending)
    }

    pub fn failed_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|state| matches!(state, SegmentState::Failed))
            .count()
    }
}
