//! Seams between the routing engine and its collaborators.
//!
//! The engine only talks to the outside world through these traits: the
//! routing service, the durable storage behind the route cache, and whoever
//! displays the streamed results.

use std::sync::Arc;
use std::sync::mpsc::Sender;

use crate::error::{CacheError, RoutingFailure};
use crate::itinerary::{Coord, Generation};
use crate::segment::{AggregateState, ResolvedSegment};

/// Resolves the drive between two coordinates with one external call.
///
/// Implementations must not retry internally.
pub trait RoutingClient: Send + Sync {
    fn resolve(&self, from: Coord, to: Coord) -> Result<ResolvedSegment, RoutingFailure>;
}

impl<T: RoutingClient + ?Sized> RoutingClient for Arc<T> {
    fn resolve(&self, from: Coord, to: Coord) -> Result<ResolvedSegment, RoutingFailure> {
        (**self).resolve(from, to)
    }
}

/// Durable storage for the serialized route cache blob.
///
/// Treated as best effort: the blob may be absent, and writes may fail.
pub trait CacheStore: Send + Sync {
    /// Returns the stored blob, or `None` if nothing was ever saved.
    fn load(&self) -> Result<Option<String>, CacheError>;

    fn save(&self, blob: &str) -> Result<(), CacheError>;
}

/// Receives the aggregate states streamed by recompute runs.
///
/// Calls are made while the orchestrator's generation lock is held. That
/// lock is not reentrant: a callback must not call back into the
/// orchestrator at all (`submit`, `run`, `current_generation`). Everything a
/// callback needs arrives as arguments; forward it elsewhere (a channel, as
/// [`RecomputeEvent`] does) to react to it.
pub trait StateSubscriber: Send + Sync {
    fn on_state(&self, generation: Generation, state: &AggregateState);

    /// `true` when a run over two or more stops starts, `false` once the
    /// current generation has published its final state.
    fn on_progress(&self, _in_progress: bool) {}
}

/// Events forwarded by the channel subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum RecomputeEvent {
    State {
        generation: Generation,
        state: AggregateState,
    },
    Progress(bool),
}

impl StateSubscriber for Sender<RecomputeEvent> {
    fn on_state(&self, generation: Generation, state: &AggregateState) {
        // Receiver gone means nobody is watching anymore.
        let _ = self.send(RecomputeEvent::State {
            generation,
            state: state.clone(),
        });
    }

    fn on_progress(&self, in_progress: bool) {
        let _ = self.send(RecomputeEvent::Progress(in_progress));
    }
}
