use std::sync::Arc;

use axum::body::Bytes;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum_test::TestServer;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};

use bazaar_shop::router::build_router;
use bazaar_shop::state::{AppState, JwtSettings};
use bazaar_testing::auth::{MockAuth, TEST_JWT_SECRET};
use bazaar_testing::envelope::expect_error;

/// Server with no database behind it. Every request here must be answered
/// before a repository is touched.
fn server() -> TestServer {
    let state = AppState {
        db: DatabaseConnection::Disconnected,
        jwt: JwtSettings {
            secret: Arc::from(TEST_JWT_SECRET),
            expiration_secs: 3600,
        },
    };
    TestServer::new(build_router(state)).unwrap()
}

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn healthz_is_always_ok() {
    let response = server().get("/healthz").await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn readyz_reports_unavailable_without_database() {
    let response = server().get("/readyz").await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn should_attach_request_id_to_responses() {
    let response = server().get("/healthz").await;
    assert!(response.headers().contains_key("x-request-id"));
}

// ── Bearer middleware ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_missing_token() {
    let response = server().get("/api/v1/cart").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(expect_error(&body), "authorization token required");
}

#[tokio::test]
async fn should_reject_garbage_token() {
    let response = server()
        .get("/api/v1/orders")
        .authorization_bearer("not-a-jwt")
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(expect_error(&body), "invalid or expired token");
}

#[tokio::test]
async fn should_reject_token_signed_with_other_secret() {
    let auth = MockAuth::user().with_secret("some-other-secret");
    let response = server()
        .get("/api/v1/users/me")
        .add_header(AUTHORIZATION, auth.header_value())
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

// ── Admin guard ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_forbid_admin_routes_to_regular_users() {
    let auth = MockAuth::user();
    let response = server()
        .post("/api/v1/admin/categories")
        .add_header(AUTHORIZATION, auth.header_value())
        .json(&json!({ "name": "Books" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(expect_error(&body), "admin access required");
}

#[tokio::test]
async fn should_require_token_on_admin_routes() {
    let response = server().get("/api/v1/admin/orders").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_let_admin_through_to_body_validation() {
    let auth = MockAuth::admin();
    let response = server()
        .post("/api/v1/admin/categories")
        .add_header(AUTHORIZATION, auth.header_value())
        .bytes(Bytes::from_static(b"{\"name\":"))
        .content_type("application/json")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    expect_error(&body);
}

// ── Input validation ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_negative_price_filter() {
    let response = server().get("/api/v1/products?min-price=-5").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(expect_error(&body), "min price cannot be negative");
}

#[tokio::test]
async fn should_reject_malformed_registration_body() {
    let response = server()
        .post("/api/v1/auth/register")
        .bytes(Bytes::from_static(b"{not json"))
        .content_type("application/json")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    expect_error(&body);
}

#[tokio::test]
async fn should_reject_non_uuid_path_id() {
    let response = server().get("/api/v1/products/not-a-uuid").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_reject_unknown_order_status_filter() {
    let auth = MockAuth::admin();
    let response = server()
        .get("/api/v1/admin/orders?status=lost")
        .add_header(AUTHORIZATION, auth.header_value())
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(expect_error(&body), "invalid order status: lost");
}
