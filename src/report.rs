//! Plain-text rendering of an aggregate state.

use std::fmt::Write;

use crate::segment::{AggregateState, SegmentState};

/// `Segment 1: 2 min – 1.5 km`, with `N/A` for anything unresolved.
pub fn segment_line(index: usize, segment: &SegmentState) -> String {
    let minutes = segment
        .duration_seconds()
        .map(|seconds| format!("{}", (seconds / 60.0).round()))
        .unwrap_or_else(|| "N/A".to_string());
    let km = segment
        .distance_meters()
        .map(|meters| format!("{:.1}", meters / 1000.0))
        .unwrap_or_else(|| "N/A".to_string());
    format!("Segment {}: {} min – {} km", index + 1, minutes, km)
}

pub fn total_line(state: &AggregateState) -> String {
    format!("Total Distance: {:.2} km", state.total_distance_meters / 1000.0)
}

pub fn render(state: &AggregateState) -> String {
    let mut out = total_line(state);
    for (index, segment) in state.segments.iter().enumerate() {
        // Writing to a String cannot fail.
        let _ = write!(out, "\n{}", segment_line(index, segment));
    }
    out
}
