use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use roadtrip_router::cache::{FileStore, MemoryStore, RouteCache};
use roadtrip_router::itinerary::{Itinerary, Waypoint};
use roadtrip_router::orchestrator::{Orchestrator, RunOutcome};
use roadtrip_router::osrm::{OsrmClient, OsrmConfig};
use roadtrip_router::report;
use roadtrip_router::resolver::{ResolverOptions, SegmentResolver};
use roadtrip_router::traits::RecomputeEvent;

/// Streams drive times and distances between the stops of a road trip
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON file holding an array of {lat, lon, comment} stops
    #[arg(short, long)]
    waypoints: PathBuf,

    /// Directory of the persistent route cache
    #[arg(long, default_value = ".")]
    cache_dir: PathBuf,

    /// Keep the route cache in memory only
    #[arg(long)]
    ephemeral: bool,

    /// OSRM server (defaults to OSRM_BASE_URL or the public demo server)
    #[arg(long)]
    osrm_url: Option<String>,

    /// OSRM profile (defaults to OSRM_PROFILE or "driving")
    #[arg(long)]
    profile: Option<String>,

    /// Pause after each routing request, in milliseconds
    #[arg(long, default_value_t = 600)]
    min_interval_ms: u64,

    /// Drive the trip in the opposite direction
    #[arg(long)]
    reverse: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into())))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let raw = fs::read_to_string(&cli.waypoints)
        .with_context(|| format!("failed to read {}", cli.waypoints.display()))?;
    let waypoints: Vec<Waypoint> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse waypoints in {}", cli.waypoints.display()))?;
    let mut itinerary = Itinerary::new(waypoints);
    if cli.reverse {
        itinerary = itinerary.reversed();
    }

    let mut config = OsrmConfig::from_env();
    if let Some(url) = cli.osrm_url {
        config.base_url = url;
    }
    if let Some(profile) = cli.profile {
        config.profile = profile;
    }
    let client = OsrmClient::new(config).context("failed to build HTTP client")?;

    let cache = if cli.ephemeral {
        RouteCache::load(MemoryStore::new())
    } else {
        let store = FileStore::in_dir(&cli.cache_dir);
        tracing::info!(path = %store.path().display(), "using route cache");
        RouteCache::load(store)
    };
    let options = ResolverOptions {
        min_call_interval: Duration::from_millis(cli.min_interval_ms),
    };
    let resolver = SegmentResolver::new(client, cache, options);

    let (tx, rx) = mpsc::channel::<RecomputeEvent>();
    let orchestrator = Orchestrator::new(resolver, Arc::new(tx));
    let Some(handle) = orchestrator.submit_itinerary(&itinerary) else {
        bail!("nothing to recompute");
    };

    loop {
        match rx.recv_timeout(Duration::from_millis(250)) {
            Ok(RecomputeEvent::State { state, .. }) => {
                let done = state.segments.iter().filter(|s| !s.is_pending()).count();
                if let Some(index) = done.checked_sub(1) {
                    println!("{}", report::segment_line(index, &state.segments[index]));
                }
            }
            Ok(RecomputeEvent::Progress(false)) => break,
            Ok(RecomputeEvent::Progress(true)) => {}
            // A run that died without publishing its final state.
            Err(RecvTimeoutError::Timeout) if handle.is_finished() => break,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    match handle.join() {
        RunOutcome::Published(state) => {
            println!();
            println!("{}", report::render(&state));
        }
        RunOutcome::Superseded => bail!("recompute was superseded"),
    }

    Ok(())
}
