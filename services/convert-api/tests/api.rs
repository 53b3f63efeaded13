//! Router-level tests for the Convert API.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use projection::ReferenceSystemRegistry;
use reproject_common::ReferenceSystemId;
use reproject_engine::{Engine, EngineConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

use convert_api::{build_router, AppState};
use test_utils::{collection_of, collection_with_unsupported_second, convert_request, utm_line_geojson};

fn app_with(config: EngineConfig) -> Router {
    let engine = Engine::new(Arc::new(ReferenceSystemRegistry::with_defaults()), config);
    let state = AppState::new(engine, ReferenceSystemId::WGS84)
        .with_request_timeout(Duration::from_secs(10));
    build_router(Arc::new(state))
}

fn app() -> Router {
    app_with(EngineConfig::default())
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_convert_utm_line() {
    let (status, body) = post_json(app(), "/convert", convert_request(json!(32632), utm_line_geojson())).await;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["type"], "FeatureCollection");

    let feature = &body["features"][0];
    assert_eq!(feature["properties"], json!({"name": "survey line", "tags": ["a", "b"]}));
    assert_eq!(feature["geometry"]["type"], "LineString");

    let coords = feature["geometry"]["coordinates"].as_array().unwrap();
    assert_eq!(coords.len(), 2);
    for coord in coords {
        let lon = coord[0].as_f64().unwrap();
        let lat = coord[1].as_f64().unwrap();
        assert!(lon > 10.0 && lon < 11.0, "longitude was {}", lon);
        assert!(lat > 32.0 && lat < 33.0, "latitude was {}", lat);
        assert_eq!(coord.as_array().unwrap().len(), 2);
    }
}

#[tokio::test]
async fn test_convert_accepts_epsg_code_alias_and_target() {
    let body = json!({
        "epsg_code": "EPSG:32632",
        "target_crs": "EPSG:3857",
        "geojson": utm_line_geojson(),
    });
    let (status, body) = post_json(app(), "/convert", body).await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);

    // Web Mercator metres, not degrees
    let x = body["features"][0]["geometry"]["coordinates"][0][0].as_f64().unwrap();
    assert!(x > 1_000_000.0, "x was {}", x);
}

#[tokio::test]
async fn test_unknown_reference_system() {
    let (status, body) = post_json(app(), "/convert", convert_request(json!(999999), utm_line_geojson())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "unknown_reference_system");
    assert!(body["feature_index"].is_null());
}

#[tokio::test]
async fn test_unparsable_reference_system() {
    let (status, body) = post_json(
        app(),
        "/convert",
        convert_request(json!("+proj=utm +zone=32"), utm_line_geojson()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "unknown_reference_system");
}

#[tokio::test]
async fn test_unsupported_kind_reports_feature_index() {
    let geojson = serde_json::to_value(collection_with_unsupported_second()).unwrap();
    let (status, body) = post_json(app(), "/convert", convert_request(json!(32632), geojson)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "unsupported_geometry_kind");
    assert_eq!(body["feature_index"], 1);
    assert!(body.get("features").is_none());
}

#[tokio::test]
async fn test_mixed_arity_rejected() {
    let geojson = json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "geometry": {"type": "LineString", "coordinates": [[630349.2, 3576258.5], [630348.8, 3576258.1, 12.0]]},
            "properties": {}
        }]
    });
    let (status, body) = post_json(app(), "/convert", convert_request(json!(32632), geojson)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "inconsistent_dimensionality");
    assert_eq!(body["feature_index"], 0);
}

#[tokio::test]
async fn test_malformed_body() {
    let (status, body) = post_json(app(), "/convert", json!({"geojson": utm_line_geojson()})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "malformed_input");

    let (status, body) = post_json(
        app(),
        "/convert",
        convert_request(json!(32632), json!({"type": "FeatureCollection", "features": [{"geometry": {"type": "Point", "coordinates": [1]}}]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "malformed_input");
    assert_eq!(body["feature_index"], 0);
}

#[tokio::test]
async fn test_bad_position_reports_feature_index() {
    let point = |coordinates: Value| {
        json!({"type": "Feature", "geometry": {"type": "Point", "coordinates": coordinates}, "properties": {}})
    };
    for bad in [json!([1.0, 2.0, 3.0, 4.0]), json!([1, "a"])] {
        let geojson = json!({
            "type": "FeatureCollection",
            "features": [point(json!([630349.2, 3576258.5])), point(json!([630348.8, 3576258.1])), point(bad.clone())]
        });
        let (status, body) = post_json(app(), "/convert", convert_request(json!(32632), geojson)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "position {}", bad);
        assert_eq!(body["kind"], "malformed_input");
        assert_eq!(body["feature_index"], 2);
    }
}

#[tokio::test]
async fn test_feature_limit() {
    let app = app_with(EngineConfig {
        max_features: 1,
        ..Default::default()
    });
    let geojson = serde_json::to_value(collection_of(vec![test_utils::utm_line(), test_utils::utm_line()])).unwrap();
    let (status, body) = post_json(app, "/convert", convert_request(json!(32632), geojson)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["kind"], "too_large");
}

#[tokio::test]
async fn test_strip_z() {
    let geojson = serde_json::to_value(collection_of(vec![test_utils::utm_line_3d()])).unwrap();
    let (status, body) = post_json(app(), "/strip-z", json!({ "geojson": geojson })).await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);

    let coords = body["features"][0]["geometry"]["coordinates"].as_array().unwrap();
    assert_eq!(coords.len(), 3);
    assert_eq!(coords[0], json!([630349.2, 3576258.53]));
    assert!(coords.iter().all(|c| c.as_array().unwrap().len() == 2));
}

#[tokio::test]
async fn test_reference_systems() {
    let (status, body) = get(app(), "/reference-systems").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["default_target"], "EPSG:4326");

    let systems = body["reference_systems"].as_array().unwrap();
    let lambert = systems.iter().find(|s| s["code"] == 2154).unwrap();
    assert_eq!(lambert["name"], "RGF93 v1 / Lambert-93");
    assert_eq!(lambert["units"], "meters");
}

#[tokio::test]
async fn test_health_and_ready() {
    let (status, body) = get(app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = get(app(), "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);
}

#[tokio::test]
async fn test_metrics_without_recorder() {
    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
