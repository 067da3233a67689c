mod common;

use axum::http::{StatusCode, header};
use common::{UnreachableCounterStore, spawn_app_with, test_config};
use hotel_listing::config::Config;
use hotel_listing::infrastructure::counters::MemoryCounterStore;
use std::sync::Arc;

fn limited_config() -> Config {
    Config {
        rate_limit_requests: 5,
        rate_limit_window_seconds: 60,
        ..test_config()
    }
}

#[tokio::test]
async fn test_sixth_request_in_window_is_throttled() {
    let app = spawn_app_with(limited_config(), Arc::new(MemoryCounterStore::new()));

    for expected_remaining in (0..5).rev() {
        let response = app
            .server
            .get("/api/v1/countries")
            .add_header("X-Forwarded-For", "203.0.113.7")
            .await;
        response.assert_status_ok();
        assert_eq!(
            response.header("x-ratelimit-remaining"),
            expected_remaining.to_string().as_str()
        );
    }

    let response = app
        .server
        .get("/api/v1/countries")
        .add_header("X-Forwarded-For", "203.0.113.7")
        .await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response
        .header(header::RETRY_AFTER)
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_after));
    assert_eq!(response.header("x-ratelimit-limit"), "5");

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "throttled");
}

#[tokio::test]
async fn test_clients_are_counted_separately() {
    let app = spawn_app_with(limited_config(), Arc::new(MemoryCounterStore::new()));

    for _ in 0..5 {
        app.server
            .get("/api/v1/hotels")
            .add_header("X-Forwarded-For", "203.0.113.7")
            .await
            .assert_status_ok();
    }

    app.server
        .get("/api/v1/hotels")
        .add_header("X-Forwarded-For", "203.0.113.7")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    app.server
        .get("/api/v1/hotels")
        .add_header("X-Forwarded-For", "198.51.100.20")
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_token_subject_is_its_own_client() {
    let app = spawn_app_with(limited_config(), Arc::new(MemoryCounterStore::new()));
    let token = app.token("alice", &[]);

    for _ in 0..5 {
        app.server
            .get("/api/v1/hotels")
            .add_header("X-Forwarded-For", "203.0.113.7")
            .await
            .assert_status_ok();
    }

    // Same address, but the bearer subject identifies a different client.
    app.server
        .get("/api/v1/hotels")
        .add_header("X-Forwarded-For", "203.0.113.7")
        .authorization_bearer(&token)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_unreachable_counter_store_fails_open() {
    let app = spawn_app_with(limited_config(), Arc::new(UnreachableCounterStore));

    for _ in 0..10 {
        let response = app.server.get("/api/v1/countries").await;
        response.assert_status_ok();
        assert!(response.maybe_header("x-ratelimit-remaining").is_none());
    }
}

#[tokio::test]
async fn test_unreachable_counter_store_reports_degraded_health() {
    let app = spawn_app_with(limited_config(), Arc::new(UnreachableCounterStore));

    let response = app.server.get("/health").expect_failure().await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["rate_limit_store"]["status"], "error");
}
