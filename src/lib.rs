//! roadtrip-router core
//!
//! Resolves drive time, distance and geometry between the consecutive stops
//! of an itinerary, caching every segment by its endpoints and streaming
//! partial results while the itinerary keeps changing.

pub mod cache;
pub mod error;
pub mod itinerary;
pub mod key;
pub mod orchestrator;
pub mod osrm;
pub mod polyline;
pub mod report;
pub mod resolver;
pub mod segment;
pub mod traits;
