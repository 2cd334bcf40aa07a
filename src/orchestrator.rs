//! Itinerary recompute orchestration.
//!
//! Every submitted waypoint sequence starts a new generation. A run walks the
//! consecutive pairs strictly in order and publishes the partial
//! [`AggregateState`] after each segment. Runs are never cancelled; a run
//! whose generation is no longer current simply stops and publishes nothing
//! more. Its network results are already in the shared cache by then.

use std::iter::FusedIterator;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::itinerary::{Coord, Generation, Itinerary, Waypoint};
use crate::resolver::{Pacer, SegmentResolver};
use crate::segment::AggregateState;
use crate::traits::{RoutingClient, StateSubscriber};

/// The most recently started generation and the sequence it recomputes.
#[derive(Default)]
struct Current {
    generation: Generation,
    waypoints: Option<Vec<Waypoint>>,
}

/// Holds the current generation. Bumping it and publishing both happen under
/// the same lock, so a stale run cannot publish once a newer one has begun.
///
/// Subscriber callbacks are invoked with this lock held.
struct GenerationGate {
    current: Mutex<Current>,
    subscriber: Arc<dyn StateSubscriber>,
}

impl GenerationGate {
    fn begin(&self, waypoints: &[Waypoint]) -> Generation {
        let mut current = self.current.lock();
        self.advance(&mut current, waypoints)
    }

    /// Like `begin`, but starts nothing when `waypoints` equals the sequence
    /// of the current generation.
    fn begin_if_changed(&self, waypoints: &[Waypoint]) -> Option<Generation> {
        let mut current = self.current.lock();
        if current.waypoints.as_deref() == Some(waypoints) {
            return None;
        }
        Some(self.advance(&mut current, waypoints))
    }

    fn advance(&self, current: &mut Current, waypoints: &[Waypoint]) -> Generation {
        current.generation += 1;
        current.waypoints = Some(waypoints.to_vec());
        if waypoints.len() >= 2 {
            self.subscriber.on_progress(true);
        }
        current.generation
    }

    fn generation(&self) -> Generation {
        self.current.lock().generation
    }

    fn is_current(&self, generation: Generation) -> bool {
        self.generation() == generation
    }

    fn publish(&self, generation: Generation, state: &AggregateState, finished: bool) -> bool {
        let current = self.current.lock();
        if current.generation != generation {
            return false;
        }
        self.subscriber.on_state(generation, state);
        if finished {
            self.subscriber.on_progress(false);
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Published,
    Superseded,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Final state of a run that stayed current to the end.
    Published(AggregateState),
    Superseded,
}

/// One generation's recompute, as a lazy stream of published states.
///
/// Each call to `next` resolves one more segment and yields the state that
/// was published for it. The stream ends after the final state, or as soon
/// as a newer generation has started.
pub struct RecomputeRun<C> {
    generation: Generation,
    stops: Vec<Coord>,
    resolver: Arc<SegmentResolver<C>>,
    gate: Arc<GenerationGate>,
    pacer: Pacer,
    state: AggregateState,
    next_index: usize,
    status: RunStatus,
}

impl<C: RoutingClient> RecomputeRun<C> {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Network calls this run has made so far.
    pub fn network_calls(&self) -> usize {
        self.pacer.network_calls()
    }

    /// Runs to the end.
    pub fn drive(mut self) -> RunOutcome {
        while self.next().is_some() {}
        match self.status {
            RunStatus::Published => RunOutcome::Published(self.state),
            RunStatus::Running | RunStatus::Superseded => RunOutcome::Superseded,
        }
    }

    fn publish(&mut self, finished: bool) -> Option<AggregateState> {
        if !self.gate.publish(self.generation, &self.state, finished) {
            return self.supersede();
        }
        if finished {
            self.status = RunStatus::Published;
            tracing::info!(
                generation = self.generation,
                segments = self.state.segments.len(),
                failed = self.state.failed_count(),
                network_calls = self.pacer.network_calls(),
                total_km = self.state.total_distance_meters / 1000.0,
                "itinerary routes published"
            );
        }
        Some(self.state.clone())
    }

    fn supersede(&mut self) -> Option<AggregateState> {
        tracing::debug!(
            generation = self.generation,
            resolved = self.next_index,
            "run superseded by a newer itinerary"
        );
        self.status = RunStatus::Superseded;
        None
    }
}

impl<C: RoutingClient> Iterator for RecomputeRun<C> {
    type Item = AggregateState;

    fn next(&mut self) -> Option<AggregateState> {
        if self.status != RunStatus::Running {
            return None;
        }

        let segment_count = self.state.segments.len();
        if segment_count == 0 {
            return self.publish(true);
        }

        // Skip the network work entirely if someone already moved on.
        if !self.gate.is_current(self.generation) {
            return self.supersede();
        }

        let index = self.next_index;
        let segment = self
            .resolver
            .resolve_segment(self.stops[index], self.stops[index + 1], &mut self.pacer);
        self.state.set(index, segment);
        self.next_index += 1;

        self.publish(self.next_index == segment_count)
    }
}

impl<C: RoutingClient> FusedIterator for RecomputeRun<C> {}

/// A run driven on a background thread.
pub struct RunHandle {
    generation: Generation,
    handle: JoinHandle<RunOutcome>,
}

impl RunHandle {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn join(self) -> RunOutcome {
        match self.handle.join() {
            Ok(outcome) => outcome,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

pub struct Orchestrator<C> {
    resolver: Arc<SegmentResolver<C>>,
    gate: Arc<GenerationGate>,
}

impl<C: RoutingClient + 'static> Orchestrator<C> {
    pub fn new(resolver: SegmentResolver<C>, subscriber: Arc<dyn StateSubscriber>) -> Self {
        Self {
            resolver: Arc::new(resolver),
            gate: Arc::new(GenerationGate {
                current: Mutex::new(Current::default()),
                subscriber,
            }),
        }
    }

    pub fn resolver(&self) -> &SegmentResolver<C> {
        &self.resolver
    }

    /// Most recently started generation; 0 before the first run.
    pub fn current_generation(&self) -> Generation {
        self.gate.generation()
    }

    /// Starts a new generation for `waypoints` and returns its run, unstarted.
    ///
    /// Any older run stops publishing from this point on.
    pub fn run(&self, waypoints: &[Waypoint]) -> RecomputeRun<C> {
        let generation = self.gate.begin(waypoints);
        self.start(generation, waypoints)
    }

    /// Recomputes on a background thread when `waypoints` differs from the
    /// sequence of the current generation. Returns `None` when nothing changed.
    pub fn submit(&self, waypoints: &[Waypoint]) -> Option<RunHandle> {
        let Some(generation) = self.gate.begin_if_changed(waypoints) else {
            tracing::debug!("waypoint sequence unchanged, skipping recompute");
            return None;
        };

        let run = self.start(generation, waypoints);
        let handle = thread::spawn(move || run.drive());
        Some(RunHandle { generation, handle })
    }

    /// Submits the snapshot's sequence; the returned handle carries the
    /// generation the snapshot was tagged with.
    pub fn submit_itinerary(&self, itinerary: &Itinerary) -> Option<RunHandle> {
        self.submit(itinerary.waypoints())
    }

    fn start(&self, generation: Generation, waypoints: &[Waypoint]) -> RecomputeRun<C> {
        let segment_count = waypoints.len().saturating_sub(1);
        tracing::debug!(generation, stops = waypoints.len(), "starting itinerary recompute");

        RecomputeRun {
            generation,
            stops: waypoints.iter().map(Waypoint::coord).collect(),
            resolver: Arc::clone(&self.resolver),
            gate: Arc::clone(&self.gate),
            pacer: self.resolver.pacer(),
            state: AggregateState::pending(segment_count),
            next_index: 0,
            status: RunStatus::Running,
        }
    }
}
