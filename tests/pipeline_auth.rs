mod common;

use axum::http::{StatusCode, header};
use chrono::Utc;
use common::spawn_app;
use hotel_listing::application::services::Claims;
use serde_json::json;

fn hotel_payload() -> serde_json::Value {
    json!({
        "name": "Half Moon",
        "address": "Rose Hall",
        "rating": 4.6,
        "country_id": 1
    })
}

#[tokio::test]
async fn test_expired_token_is_rejected_with_reason() {
    let app = spawn_app();
    let expired = app
        .tokens
        .sign(&Claims {
            sub: "admin".to_string(),
            roles: vec!["Administrator".to_string()],
            exp: Utc::now().timestamp() - 3600,
            iat: None,
            iss: None,
        })
        .unwrap();

    let response = app
        .server
        .put("/api/v1/hotels/1")
        .authorization_bearer(&expired)
        .json(&hotel_payload())
        .expect_failure()
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert!(
        response
            .header(header::WWW_AUTHENTICATE)
            .to_str()
            .unwrap()
            .starts_with("Bearer")
    );
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "auth_error");
    assert_eq!(json["error"]["details"]["reason"], "expired");
}

#[tokio::test]
async fn test_missing_token_on_protected_route() {
    let app = spawn_app();

    let response = app
        .server
        .post("/api/v1/hotels")
        .json(&hotel_payload())
        .expect_failure()
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["details"]["reason"], "missing");
}

#[tokio::test]
async fn test_tampered_token_is_rejected() {
    let app = spawn_app();
    let mut token = app.admin_token();
    token.push('x');

    let response = app
        .server
        .delete("/api/v1/hotels/1")
        .authorization_bearer(&token)
        .expect_failure()
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_role_is_forbidden() {
    let app = spawn_app();
    let user = app.token("guest", &["User"]);

    let response = app
        .server
        .post("/api/v1/hotels")
        .authorization_bearer(&user)
        .json(&hotel_payload())
        .expect_failure()
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(
        response.json::<serde_json::Value>()["error"]["code"],
        "forbidden"
    );
}

#[tokio::test]
async fn test_administrator_creates_hotel() {
    let app = spawn_app();

    let response = app
        .server
        .post("/api/v1/hotels")
        .authorization_bearer(app.admin_token())
        .json(&hotel_payload())
        .await;

    response.assert_status(StatusCode::CREATED);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["name"], "Half Moon");
    assert!(json["id"].as_i64().unwrap() > 3);
}

#[tokio::test]
async fn test_invalid_body_is_rejected_before_handler() {
    let app = spawn_app();

    let response = app
        .server
        .post("/api/v1/hotels")
        .authorization_bearer(app.admin_token())
        .json(&json!({
            "name": "",
            "address": "Rose Hall",
            "rating": 9.0,
            "country_id": 1
        }))
        .expect_failure()
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "validation_error");
    assert!(json["error"]["details"].get("rating").is_some());
}

#[tokio::test]
async fn test_public_route_ignores_bad_credentials() {
    let app = spawn_app();

    app.server
        .get("/api/v1/countries")
        .authorization_bearer("not-a-jwt")
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_profile_reflects_token_claims() {
    let app = spawn_app();
    let token = app.token("carol", &["User", "Auditor"]);

    let response = app
        .server
        .get("/api/v1/account/profile")
        .authorization_bearer(&token)
        .await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["subject"], "carol");
    assert_eq!(json["roles"], json!(["Auditor", "User"]));
}
