mod common;

use axum::http::StatusCode;
use common::spawn_app;

#[tokio::test]
async fn test_unknown_version_is_not_found() {
    let app = spawn_app();

    let response = app
        .server
        .get("/api/v3/hotels")
        .add_header("x-correlation-id", "trace-0001-abcd")
        .expect_failure()
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.header("x-correlation-id"), "trace-0001-abcd");
    assert_eq!(response.header("api-supported-versions"), "v1, v2");

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "not_found");
    assert_eq!(json["error"]["correlation_id"], "trace-0001-abcd");
}

#[tokio::test]
async fn test_unversioned_path_uses_default_version() {
    let app = spawn_app();

    let response = app.server.get("/api/countries").await;

    response.assert_status_ok();
    // v1 returns a paged listing
    assert!(response.json::<serde_json::Value>().get("items").is_some());
}

#[tokio::test]
async fn test_version_header_selects_group() {
    let app = spawn_app();

    let response = app
        .server
        .get("/api/countries")
        .add_header("api-version", "2.0")
        .await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    assert!(json.is_array());
    assert!(json[0].get("hotel_count").is_some());
}

#[tokio::test]
async fn test_version_query_parameter_selects_group() {
    let app = spawn_app();

    let response = app
        .server
        .get("/api/countries")
        .add_query_param("api-version", "2")
        .await;

    response.assert_status_ok();
    assert!(response.json::<serde_json::Value>().is_array());
}

#[tokio::test]
async fn test_route_missing_from_version_is_not_found() {
    let app = spawn_app();

    app.server
        .get("/api/v2/account/profile")
        .authorization_bearer(app.token("alice", &[]))
        .expect_failure()
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_version_label_is_not_found() {
    let app = spawn_app();

    app.server
        .get("/api/countries")
        .add_header("api-version", "latest")
        .expect_failure()
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_generated_correlation_id_is_returned() {
    let app = spawn_app();

    let response = app.server.get("/api/v1/hotels").await;

    let id = response.header("x-correlation-id");
    assert!(id.to_str().unwrap().len() >= 8);
}
