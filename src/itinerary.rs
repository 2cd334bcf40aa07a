//! Waypoints and itinerary snapshots.
//!
//! An [`Itinerary`] is immutable: every edit returns a new snapshot. The
//! orchestrator tags each snapshot it recomputes with a [`Generation`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A (latitude, longitude) pair.
pub type Coord = (f64, f64);

/// A single stop on the trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub comment: String,
}

impl Waypoint {
    pub fn new(lat: f64, lon: f64, comment: impl Into<String>) -> Self {
        Self {
            lat,
            lon,
            comment: comment.into(),
        }
    }

    /// Location coordinates (lat, lon).
    pub fn coord(&self) -> Coord {
        (self.lat, self.lon)
    }
}

/// Monotonically increasing snapshot counter, assigned per recompute.
pub type Generation = u64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ItineraryError {
    #[error("waypoint index {index} is out of range (itinerary has {len} stops)")]
    OutOfRange { index: usize, len: usize },

    #[error("cannot move waypoint {0} onto itself")]
    SamePosition(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    waypoints: Vec<Waypoint>,
}

impl Itinerary {
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        Self { waypoints }
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Appends a stop at the end of the trip.
    pub fn push(&self, waypoint: Waypoint) -> Self {
        let mut waypoints = self.waypoints.clone();
        waypoints.push(waypoint);
        Self::new(waypoints)
    }

    pub fn remove(&self, index: usize) -> Result<Self, ItineraryError> {
        self.check(index)?;
        let mut waypoints = self.waypoints.clone();
        waypoints.remove(index);
        Ok(Self::new(waypoints))
    }

    /// Moves the stop at `from` so that it ends up at position `to`.
    pub fn move_waypoint(&self, from: usize, to: usize) -> Result<Self, ItineraryError> {
        self.check(from)?;
        self.check(to)?;
        if from == to {
            return Err(ItineraryError::SamePosition(from));
        }
        let mut waypoints = self.waypoints.clone();
        let moved = waypoints.remove(from);
        waypoints.insert(to, moved);
        Ok(Self::new(waypoints))
    }

    pub fn set_comment(&self, index: usize, comment: impl Into<String>) -> Result<Self, ItineraryError> {
        self.check(index)?;
        let mut waypoints = self.waypoints.clone();
        waypoints[index].comment = comment.into();
        Ok(Self::new(waypoints))
    }

    /// Returns the trip driven in the opposite direction.
    pub fn reversed(&self) -> Self {
        let mut waypoints = self.waypoints.clone();
        waypoints.reverse();
        Self::new(waypoints)
    }

    fn check(&self, index: usize) -> Result<(), ItineraryError> {
        if index < self.waypoints.len() {
            Ok(())
        } else {
            Err(ItineraryError::OutOfRange {
                index,
                len: self.waypoints.len(),
            })
        }
    }
}
