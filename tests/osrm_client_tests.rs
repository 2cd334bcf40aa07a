//! HTTP contract of the OSRM client against a mock server.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use roadtrip_router::error::RoutingFailure;
use roadtrip_router::itinerary::Coord;
use roadtrip_router::osrm::{OsrmClient, OsrmConfig};
use roadtrip_router::segment::ResolvedSegment;
use roadtrip_router::traits::RoutingClient;

const FROM: Coord = (43.3, -1.5);
const TO: Coord = (43.4, -1.4);
const ROUTE_PATH: &str = "/route/v1/driving/-1.5,43.3;-1.4,43.4";

/// The blocking client must be built, used and dropped off the async runtime.
async fn resolve(base_url: String) -> Result<ResolvedSegment, RoutingFailure> {
    tokio::task::spawn_blocking(move || {
        let client = OsrmClient::new(OsrmConfig {
            base_url,
            profile: "driving".to_string(),
            timeout_secs: 5,
        })
        .expect("build OSRM client");
        client.resolve(FROM, TO)
    })
    .await
    .expect("blocking task")
}

#[tokio::test(flavor = "multi_thread")]
async fn test_resolves_first_route() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ROUTE_PATH))
        .and(query_param("overview", "full"))
        .and(query_param("geometries", "geojson"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "Ok",
            "routes": [
                {
                    "geometry": {"type": "LineString", "coordinates": [[-1.5, 43.3], [-1.45, 43.35], [-1.4, 43.4]]},
                    "duration": 120.0,
                    "distance": 1500.0
                },
                {
                    "geometry": {"type": "LineString", "coordinates": [[-1.5, 43.3], [-1.4, 43.4]]},
                    "duration": 999.0,
                    "distance": 9999.0
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let segment = resolve(server.uri()).await.expect("route resolves");
    assert_eq!(segment.duration_seconds, 120.0);
    assert_eq!(segment.distance_meters, 1500.0);
    assert_eq!(segment.polyline.points(), &[(43.3, -1.5), (43.35, -1.45), (43.4, -1.4)]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_empty_route_set_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ROUTE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": "NoRoute", "routes": []})))
        .mount(&server)
        .await;

    let err = resolve(server.uri()).await.unwrap_err();
    assert!(matches!(err, RoutingFailure::NoRoute(ref code) if code == "NoRoute"), "got {:?}", err);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_non_success_status_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ROUTE_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .mount(&server)
        .await;

    let err = resolve(server.uri()).await.unwrap_err();
    match err {
        RoutingFailure::Status { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "Too Many Requests");
        }
        other => panic!("expected status failure, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_garbage_body_is_a_parse_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ROUTE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = resolve(server.uri()).await.unwrap_err();
    assert!(matches!(err, RoutingFailure::Parse(_)), "got {:?}", err);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_server_is_a_transport_failure() {
    // Nothing listens on port 1.
    let err = resolve("http://127.0.0.1:1".to_string()).await.unwrap_err();
    assert!(matches!(err, RoutingFailure::Transport(_)), "got {:?}", err);
}
