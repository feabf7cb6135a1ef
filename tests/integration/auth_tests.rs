//! Authentication integration tests.
//!
//! Tests verify:
//! - Requests without a valid bearer token are rejected with 401
//! - Rejection bodies for missing, malformed and invalid tokens
//! - Valid tokens reach the filter
//! - The root endpoint stays public

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use image_filter_server::{create_router, JwtAuth, RouterConfig, TokenClaims};

use super::test_utils::{body_bytes, body_json, is_valid_jpeg, MockFilter};

const SECRET: &str = "integration-test-secret";
const FILTER_URI: &str = "/filteredimage?image_url=http://example.com/pic.jpg";

fn protected_router(filter: MockFilter) -> Router {
    create_router(filter, RouterConfig::new(SECRET).with_tracing(false))
}

fn request_with_auth(uri: &str, authorization: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, authorization)
        .body(Body::empty())
        .unwrap()
}

fn valid_token() -> String {
    JwtAuth::new(SECRET)
        .sign_with_ttl("tester", Duration::from_secs(3600))
        .unwrap()
}

// =============================================================================
// Missing and Malformed Headers
// =============================================================================

#[tokio::test]
async fn test_missing_authorization_header() {
    let dir = tempfile::tempdir().unwrap();
    let filter = MockFilter::succeeding(dir.path());
    let router = protected_router(filter.clone());

    let request = Request::builder().uri(FILTER_URI).body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body, serde_json::json!({ "message": "No authorization headers." }));
    assert_eq!(filter.call_count(), 0);
}

#[tokio::test]
async fn test_non_utf8_authorization_treated_as_missing() {
    let dir = tempfile::tempdir().unwrap();
    let filter = MockFilter::succeeding(dir.path());
    let router = protected_router(filter.clone());

    let request = Request::builder()
        .uri(FILTER_URI)
        .header(header::AUTHORIZATION, HeaderValue::from_bytes(&[0xFF]).unwrap())
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body, serde_json::json!({ "message": "No authorization headers." }));
    assert_eq!(filter.call_count(), 0);
}

#[tokio::test]
async fn test_empty_authorization_treated_as_missing() {
    let dir = tempfile::tempdir().unwrap();
    let router = protected_router(MockFilter::succeeding(dir.path()));

    let response = router
        .oneshot(request_with_auth(FILTER_URI, ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["message"], "No authorization headers.");
}

#[tokio::test]
async fn test_scheme_without_token_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let router = protected_router(MockFilter::succeeding(dir.path()));

    let response = router
        .oneshot(request_with_auth(FILTER_URI, "Bearer"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body, serde_json::json!({ "message": "Malformed token." }));
}

#[tokio::test]
async fn test_three_part_header_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let router = protected_router(MockFilter::succeeding(dir.path()));

    let header_value = format!("Bearer {} extra", valid_token());
    let response = router
        .oneshot(request_with_auth(FILTER_URI, &header_value))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Malformed token.");
    assert!(body.get("auth").is_none());
}

// =============================================================================
// Token Verification
// =============================================================================

async fn assert_rejected(router: Router, authorization: &str) {
    let response = router
        .oneshot(request_with_auth(FILTER_URI, authorization))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(
        body,
        serde_json::json!({ "auth": false, "message": "Failed to authenticate." })
    );
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let filter = MockFilter::succeeding(dir.path());

    assert_rejected(protected_router(filter.clone()), "Bearer not-a-jwt").await;
    assert_eq!(filter.call_count(), 0);
}

#[tokio::test]
async fn test_wrong_secret_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let token = JwtAuth::new("some-other-secret")
        .sign_with_ttl("tester", Duration::from_secs(3600))
        .unwrap();

    assert_rejected(
        protected_router(MockFilter::succeeding(dir.path())),
        &format!("Bearer {}", token),
    )
    .await;
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let claims = TokenClaims {
        sub: Some("tester".to_string()),
        exp: Some(1_000_000_000),
        iat: Some(999_996_400),
    };
    let token = JwtAuth::new(SECRET).sign(&claims).unwrap();

    assert_rejected(
        protected_router(MockFilter::succeeding(dir.path())),
        &format!("Bearer {}", token),
    )
    .await;
}

#[tokio::test]
async fn test_valid_token_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let filter = MockFilter::succeeding(dir.path());
    let router = protected_router(filter.clone());

    let response = router
        .oneshot(request_with_auth(
            FILTER_URI,
            &format!("Bearer {}", valid_token()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "image/jpeg");
    assert!(is_valid_jpeg(&body_bytes(response).await));
    assert_eq!(filter.call_count(), 1);
}

#[tokio::test]
async fn test_scheme_word_not_checked() {
    let dir = tempfile::tempdir().unwrap();
    let router = protected_router(MockFilter::succeeding(dir.path()));

    let response = router
        .oneshot(request_with_auth(
            FILTER_URI,
            &format!("Token {}", valid_token()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Ordering and Public Routes
// =============================================================================

#[tokio::test]
async fn test_auth_checked_before_parameters() {
    let dir = tempfile::tempdir().unwrap();
    let router = protected_router(MockFilter::succeeding(dir.path()));

    // Missing image_url would be 400, but auth rejects first
    let request = Request::builder()
        .uri("/filteredimage")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_authorized_request_still_validates_parameters() {
    let dir = tempfile::tempdir().unwrap();
    let router = protected_router(MockFilter::succeeding(dir.path()));

    let response = router
        .oneshot(request_with_auth(
            "/filteredimage?image_url=http://example.com/pic.txt",
            &format!("Bearer {}", valid_token()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_root_is_public() {
    let dir = tempfile::tempdir().unwrap();
    let router = protected_router(MockFilter::succeeding(dir.path()));

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
