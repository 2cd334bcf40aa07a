//! Cache-first resolution of one segment, paced between network calls.

use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::cache::RouteCache;
use crate::itinerary::Coord;
use crate::key::SegmentKey;
use crate::segment::SegmentState;
use crate::traits::RoutingClient;

#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Minimum gap after a network call before the next uncached segment
    /// of the same run may call out again.
    pub min_call_interval: Duration,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            min_call_interval: Duration::from_millis(600),
        }
    }
}

/// Per-run throttle. Only network calls arm it; cache hits pass straight
/// through.
#[derive(Debug)]
pub struct Pacer {
    min_interval: Duration,
    last_call: Option<Instant>,
    network_calls: usize,
}

impl Pacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: None,
            network_calls: 0,
        }
    }

    /// Network calls made through this pacer so far.
    pub fn network_calls(&self) -> usize {
        self.network_calls
    }

    fn wait(&self) {
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                thread::sleep(self.min_interval - elapsed);
            }
        }
    }

    fn record_call(&mut self) {
        self.last_call = Some(Instant::now());
        self.network_calls += 1;
    }
}

/// Resolves segments from the route cache, falling back to the routing
/// client on a miss.
///
/// The cache lock is only held for lookups and writes, never across the
/// network call, so runs of different generations can share one resolver.
pub struct SegmentResolver<C> {
    client: C,
    cache: Mutex<RouteCache>,
    options: ResolverOptions,
}

impl<C: RoutingClient> SegmentResolver<C> {
    pub fn new(client: C, cache: RouteCache, options: ResolverOptions) -> Self {
        Self {
            client,
            cache: Mutex::new(cache),
            options,
        }
    }

    /// A fresh throttle for one recompute run.
    pub fn pacer(&self) -> Pacer {
        Pacer::new(self.options.min_call_interval)
    }

    /// Returns the segment for `from` → `to`, or [`SegmentState::Failed`].
    ///
    /// Failures are not cached, so the next recompute tries again.
    pub fn resolve_segment(&self, from: Coord, to: Coord, pacer: &mut Pacer) -> SegmentState {
        let key = SegmentKey::new(from, to);

        if let Some(segment) = self.cache.lock().get(&key).cloned() {
            tracing::debug!(%key, "route cache hit");
            return SegmentState::Resolved(segment);
        }

        pacer.wait();
        let result = self.client.resolve(from, to);
        pacer.record_call();

        match result {
            Ok(segment) => {
                tracing::debug!(
                    %key,
                    duration_s = segment.duration_seconds,
                    distance_m = segment.distance_meters,
                    "segment resolved"
                );
                self.cache.lock().put(key, segment.clone());
                SegmentState::Resolved(segment)
            }
            Err(err) => {
                tracing::warn!(%key, error = %err, "segment could not be resolved");
                SegmentState::Failed
            }
        }
    }

    pub fn cached_segments(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_cached(&self, from: Coord, to: Coord) -> bool {
        self.cache.lock().contains(&SegmentKey::new(from, to))
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}
