mod common;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use jobboard_backend::{
    middleware::auth::{resolve_identity, RequestIdentity},
    models::user::Role,
    services::token_service::TokenService,
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use common::{TestApp, JWT_SECRET};

fn counting_router(counter: Arc<AtomicUsize>) -> Router {
    let tokens = Arc::new(TokenService::new(JWT_SECRET, None));
    Router::new()
        .route(
            "/whoami",
            get(move |identity: RequestIdentity| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    identity.subject_id.to_string()
                }
            }),
        )
        .layer(axum::middleware::from_fn_with_state(tokens, resolve_identity))
}

#[tokio::test]
async fn missing_token_never_reaches_the_handler() {
    let counter = Arc::new(AtomicUsize::new(0));
    let resp = counting_router(counter.clone())
        .oneshot(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn foreign_signature_never_reaches_the_handler() {
    let counter = Arc::new(AtomicUsize::new(0));
    let forged = TokenService::new("some_other_secret", None)
        .issue(&RequestIdentity::user(Uuid::new_v4(), Role::Admin, None))
        .unwrap();
    let resp = counting_router(counter.clone())
        .oneshot(
            Request::builder()
                .uri("/whoami")
                .header("token", forged)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn bearer_header_is_accepted() {
    let counter = Arc::new(AtomicUsize::new(0));
    let subject = Uuid::new_v4();
    let token = TokenService::new(JWT_SECRET, None)
        .issue(&RequestIdentity::user(subject, Role::Candidate, None))
        .unwrap();
    let resp = counting_router(counter.clone())
        .oneshot(
            Request::builder()
                .uri("/whoami")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn every_protected_group_rejects_anonymous_and_forged_requests() {
    let app = TestApp::new();
    let id = Uuid::new_v4();
    let forged = TokenService::new("some_other_secret", None)
        .issue(&RequestIdentity::user(Uuid::new_v4(), Role::Admin, None))
        .unwrap();
    let routes = [
        ("GET", "/api/admin/audit".to_string()),
        ("GET", "/api/admin/profile".to_string()),
        ("POST", format!("/api/admin/users/{}/block", id)),
        ("PUT", format!("/api/recruiters/applications/{}/stage", id)),
        ("POST", "/api/candidates/applications".to_string()),
        ("GET", "/api/candidates/recommended/jobs".to_string()),
        ("GET", "/api/organizations/me".to_string()),
    ];

    for (method, uri) in &routes {
        let body = (*method != "GET").then(|| json!({}));
        let (status, resp) = app.call(method, uri, None, body.clone()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(resp["error"], "missing_token", "{method} {uri}");

        let (status, resp) = app.call(method, uri, Some(&forged), body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(resp["error"], "invalid_token", "{method} {uri}");
    }
}

#[tokio::test]
async fn admin_profile_is_admin_only() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let candidate = app.candidate(&["rust"]).await;

    let (status, body) = app.call("GET", "/api/admin/profile", Some(&admin.token), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["id"], json!(admin.id));
    assert_eq!(body["role"], "admin");
    assert!(body.get("password_hash").is_none());

    let (status, _) = app
        .call("GET", "/api/admin/profile", Some(&candidate.token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = TestApp::new();
    let token = app
        .state
        .tokens
        .issue_with_expiry(
            &RequestIdentity::user(Uuid::new_v4(), Role::Admin, None),
            Some(chrono::Utc::now().timestamp() - 60),
        )
        .unwrap();
    let (status, body) = app.call("GET", "/api/admin/dashboard", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn public_routes_need_no_token() {
    let app = TestApp::new();
    let (status, body) = app.call("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = app.call("GET", "/api/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/recruiters/applications/{id}/stage"].is_object());
}

#[tokio::test]
async fn role_gates_reject_other_identities() {
    let app = TestApp::new();
    let candidate = app.candidate(&["rust"]).await;
    let org = app.organization().await;

    let (status, body) = app
        .call("GET", "/api/admin/dashboard", Some(&candidate.token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "access_denied");

    // Organization tokens carry no role at all.
    let (status, _) = app.call("GET", "/api/candidates/jobs", Some(&org.token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call("GET", "/api/organizations/me", Some(&candidate.token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.call("GET", "/api/organizations/me", Some(&org.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], org.id.to_string());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn registration_conflicts_and_bad_logins() {
    let app = TestApp::new();
    let payload = json!({
        "name": "Dup",
        "email": "dup@example.com",
        "mobile": "+15550001111",
        "password": common::PASSWORD
    });
    let (status, _) = app
        .call("POST", "/api/admin/register", None, Some(payload.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = app.call("POST", "/api/admin/register", None, Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (status, body) = app
        .call(
            "POST",
            "/api/admin/login",
            None,
            Some(json!({ "email": "dup@example.com", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_credentials");

    let (status, body) = app
        .call(
            "POST",
            "/api/candidates/register",
            None,
            Some(json!({
                "name": "Bad Mobile",
                "email": "mobile@example.com",
                "mobile": "call me",
                "password": common::PASSWORD
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}
