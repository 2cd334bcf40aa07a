//! Polyline representation for route geometries.
//!
//! OSRM returns GeoJSON `[lon, lat]` pairs; they are flipped to
//! `(lat, lon)` once, when the response is decoded.

use serde::{Deserialize, Serialize};

use crate::itinerary::Coord;

/// A route geometry as an ordered list of (latitude, longitude) points.
///
/// Serializes as a bare array of `[lat, lon]` pairs, which is the shape
/// stored in the route cache blob.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline {
    points: Vec<Coord>,
}

impl Polyline {
    /// Creates a new Polyline from (latitude, longitude) points.
    pub fn new(points: Vec<Coord>) -> Self {
        Self { points }
    }

    /// Builds a polyline from GeoJSON-ordered `[lon, lat]` positions.
    pub fn from_lon_lat(positions: &[[f64; 2]]) -> Self {
        Self {
            points: positions.iter().map(|[lon, lat]| (*lat, *lon)).collect(),
        }
    }

    pub fn points(&self) -> &[Coord] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Coord> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
