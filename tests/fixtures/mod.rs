//! Test fixtures for roadtrip-router.
//!
//! Provides:
//! - A scripted routing client that records every call it receives
//! - Stops along the Basque coast used by the scenario tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use roadtrip_router::cache::{MemoryStore, RouteCache};
use roadtrip_router::error::RoutingFailure;
use roadtrip_router::itinerary::{Coord, Waypoint};
use roadtrip_router::key::SegmentKey;
use roadtrip_router::orchestrator::Orchestrator;
use roadtrip_router::polyline::Polyline;
use roadtrip_router::resolver::{ResolverOptions, SegmentResolver};
use roadtrip_router::segment::ResolvedSegment;
use roadtrip_router::traits::{RecomputeEvent, RoutingClient};

pub const BIARRITZ: Coord = (43.3, -1.5);
pub const ANGLET: Coord = (43.4, -1.4);
pub const BAYONNE: Coord = (43.5, -1.3);
pub const HENDAYE: Coord = (43.36, -1.77);

pub fn stop(coord: Coord) -> Waypoint {
    Waypoint::new(coord.0, coord.1, "")
}

pub fn stops(coords: &[Coord]) -> Vec<Waypoint> {
    coords.iter().copied().map(stop).collect()
}

/// Blocks one segment's request until the test releases it.
pub struct Hold {
    pub entered: Receiver<()>,
    pub release: Sender<()>,
}

struct HeldKey {
    key: SegmentKey,
    entered: Sender<()>,
    release: Receiver<()>,
}

/// Routing client answering from a script.
///
/// Unscripted segments resolve to 60 s / 1000 m with a straight two-point
/// polyline.
#[derive(Default)]
pub struct ScriptedClient {
    routes: HashMap<SegmentKey, (f64, f64)>,
    failing: HashSet<SegmentKey>,
    held: Mutex<Option<HeldKey>>,
    calls: Mutex<Vec<(SegmentKey, Instant)>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, from: Coord, to: Coord, duration: f64, distance: f64) -> Self {
        self.routes.insert(SegmentKey::new(from, to), (duration, distance));
        self
    }

    pub fn failing(mut self, from: Coord, to: Coord) -> Self {
        self.failing.insert(SegmentKey::new(from, to));
        self
    }

    /// The first request for `from` → `to` signals `entered` and then waits
    /// for `release`.
    pub fn hold(self, from: Coord, to: Coord) -> (Self, Hold) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        *self.held.lock() = Some(HeldKey {
            key: SegmentKey::new(from, to),
            entered: entered_tx,
            release: release_rx,
        });
        (
            self,
            Hold {
                entered: entered_rx,
                release: release_tx,
            },
        )
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn called_keys(&self) -> Vec<SegmentKey> {
        self.calls.lock().iter().map(|(key, _)| key.clone()).collect()
    }

    /// Gaps between the start of consecutive calls.
    pub fn call_gaps(&self) -> Vec<Duration> {
        let calls = self.calls.lock();
        calls
            .windows(2)
            .map(|pair| pair[1].1.duration_since(pair[0].1))
            .collect()
    }
}

impl RoutingClient for ScriptedClient {
    fn resolve(&self, from: Coord, to: Coord) -> Result<ResolvedSegment, RoutingFailure> {
        let key = SegmentKey::new(from, to);
        self.calls.lock().push((key.clone(), Instant::now()));

        let held = {
            let mut slot = self.held.lock();
            if slot.as_ref().is_some_and(|held| held.key == key) {
                slot.take()
            } else {
                None
            }
        };
        if let Some(held) = held {
            let _ = held.entered.send(());
            let _ = held.release.recv();
        }

        if self.failing.contains(&key) {
            return Err(RoutingFailure::NoRoute("NoRoute".to_string()));
        }

        let (duration, distance) = self.routes.get(&key).copied().unwrap_or((60.0, 1000.0));
        Ok(ResolvedSegment {
            polyline: Polyline::new(vec![from, to]),
            duration_seconds: duration,
            distance_meters: distance,
        })
    }
}

pub fn resolver(client: Arc<ScriptedClient>, min_interval: Duration) -> SegmentResolver<Arc<ScriptedClient>> {
    SegmentResolver::new(
        client,
        RouteCache::load(MemoryStore::new()),
        ResolverOptions {
            min_call_interval: min_interval,
        },
    )
}

/// Orchestrator over `client` whose published events land in the returned
/// receiver.
pub fn orchestrator(
    client: Arc<ScriptedClient>,
    min_interval: Duration,
) -> (Orchestrator<Arc<ScriptedClient>>, Receiver<RecomputeEvent>) {
    let (tx, rx) = mpsc::channel::<RecomputeEvent>();
    let orchestrator = Orchestrator::new(resolver(client, min_interval), Arc::new(tx));
    (orchestrator, rx)
}

pub fn fast() -> Duration {
    Duration::from_millis(5)
}
