mod common;

use axum::{Router, routing::get};
use axum_test::TestServer;
use view_counter::api::handlers::health_handler;

#[tokio::test]
async fn test_health_endpoint_success() {
    let (state, _rx, _store) = common::create_test_state();
    let app = Router::new()
        .route("/api/health", get(health_handler))
        .with_state(state);

    let server = TestServer::new(app).unwrap();

    let response = server.get("/api/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["store"]["status"], "ok");
    assert_eq!(json["checks"]["view_queue"]["status"], "ok");
    assert_eq!(json["checks"]["view_queue"]["message"], "Capacity: 100");
}

#[tokio::test]
async fn test_health_degraded_when_queue_closed() {
    let (state, rx, _store) = common::create_test_state();
    drop(rx);
    let app = Router::new()
        .route("/api/health", get(health_handler))
        .with_state(state);

    let server = TestServer::new(app).unwrap();

    let response = server.get("/api/health").await;

    assert_eq!(response.status_code(), 503);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["view_queue"]["status"], "error");
}

#[tokio::test]
async fn test_health_endpoint_structure() {
    let (state, _rx, _store) = common::create_test_state();
    let app: Router = view_counter::api::routes::view_routes().with_state(state);

    let server = TestServer::new(app).unwrap();

    let response = server.get("/api/health").await;

    let json = response.json::<serde_json::Value>();

    assert!(json.get("status").is_some());
    assert!(json.get("version").is_some());
    assert!(json.get("checks").is_some());
    assert!(json["checks"].get("store").is_some());
    assert!(json["checks"].get("view_queue").is_some());
}
