//! Content address of a directed segment.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::itinerary::Coord;

/// Identity of the drive from one coordinate to another.
///
/// Coordinates are written with their exact shortest round-trip form, so a
/// point only hits the cache when it is bit-for-bit the same value. The key
/// is directional: A→B and B→A are different segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentKey(String);

impl SegmentKey {
    pub fn new(from: Coord, to: Coord) -> Self {
        Self(format!("{},{}-{},{}", from.0, from.1, to.0, to.1))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
