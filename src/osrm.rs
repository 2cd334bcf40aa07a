//! OSRM HTTP adapter for single-segment routes.

use std::env;
use std::time::Duration;

use serde::Deserialize;

use crate::error::RoutingFailure;
use crate::itinerary::Coord;
use crate::polyline::Polyline;
use crate::segment::ResolvedSegment;
use crate::traits::RoutingClient;

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://router.project-osrm.org".to_string(),
            profile: "driving".to_string(),
            timeout_secs: 10,
        }
    }
}

impl OsrmConfig {
    /// Defaults overridden by `OSRM_BASE_URL`, `OSRM_PROFILE` and
    /// `OSRM_TIMEOUT_SECS` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base_url) = env::var("OSRM_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(profile) = env::var("OSRM_PROFILE") {
            config.profile = profile;
        }
        if let Ok(raw) = env::var("OSRM_TIMEOUT_SECS") {
            match raw.parse() {
                Ok(secs) => config.timeout_secs = secs,
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid OSRM_TIMEOUT_SECS"),
            }
        }
        config
    }

    /// URL of the `route` service for the drive `from` → `to`.
    pub fn route_url(&self, from: Coord, to: Coord) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}?overview=full&geometries=geojson",
            self.base_url.trim_end_matches('/'),
            self.profile,
            from.1,
            from.0,
            to.1,
            to.0
        )
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OsrmConfig {
        &self.config
    }
}

impl RoutingClient for OsrmClient {
    fn resolve(&self, from: Coord, to: Coord) -> Result<ResolvedSegment, RoutingFailure> {
        let url = self.config.route_url(from, to);
        tracing::debug!(%url, "requesting OSRM route");

        let response = self.client.get(&url).send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(RoutingFailure::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OsrmRouteResponse = serde_json::from_str(&body)?;
        let route = parsed
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| RoutingFailure::NoRoute(parsed.code.unwrap_or_else(|| "none".to_string())))?;

        Ok(ResolvedSegment {
            polyline: Polyline::from_lon_lat(&route.geometry.coordinates),
            duration_seconds: route.duration,
            distance_meters: route.distance,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
    duration: f64,
    distance: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}
