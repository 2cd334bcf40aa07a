use thiserror::Error;

/// Why a single segment could not be resolved.
///
/// Always local to that segment: the run carries on and the segment is
/// reported as failed.
#[derive(Debug, Error)]
pub enum RoutingFailure {
    #[error("request to routing service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("routing service answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse routing response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no route between the two points (code {0})")]
    NoRoute(String),
}

/// Failure of the durable storage behind the route cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache blob is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}
