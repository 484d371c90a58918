// SPDX-License-Identifier: AGPL-3.0-or-later

//! End-to-end login flow against a mocked Google.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{bearer_token, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use equiplend_server::api::router;
use equiplend_server::auth::{Role, TokenKind};
use equiplend_server::config::{AppConfig, GoogleOAuthConfig, JwtConfig, NewStudentDefaults};
use equiplend_server::state::AppState;
use equiplend_server::storage::{AccountStore, MemoryAccountStore};

const JWT_SECRET: &str = "oauth-flow-test-secret";

fn test_config(mock_base: &str, access_ttl_secs: i64) -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        data_dir: PathBuf::from("/tmp"),
        google: GoogleOAuthConfig {
            client_id: "client-123".to_string(),
            client_secret: "secret-456".to_string(),
            redirect_uri: "http://localhost/callback".to_string(),
            allowed_domain: "sdh.hs.kr".to_string(),
            token_endpoint: format!("{mock_base}/token"),
            userinfo_endpoint: format!("{mock_base}/oauth2/v2/userinfo"),
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            access_ttl_secs,
            refresh_ttl_secs: 604_800,
        },
        student_defaults: NewStudentDefaults::default(),
    }
}

async fn mock_google(email: &str, hd: &str) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.mock-google-token",
            "expires_in": 3599,
            "token_type": "Bearer",
            "scope": "openid profile email"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/oauth2/v2/userinfo"))
        .and(bearer_token("ya29.mock-google-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "109876543210",
            "email": email,
            "verified_email": true,
            "name": "New Student",
            "hd": hd
        })))
        .mount(&server)
        .await;

    server
}

async fn post_callback(app: axum::Router, code: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/google/callback")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "code": code }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn first_login_creates_student_and_issues_session_tokens() {
    let google = mock_google("new.student@sdh.hs.kr", "sdh.hs.kr").await;
    let store = Arc::new(MemoryAccountStore::new());
    let state = AppState::new(&test_config(&google.uri(), 3600), store.clone());
    let tokens = state.tokens.clone();

    let (status, body) = post_callback(router(state), "auth-code-abc123").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["tokenType"], "Bearer");
    assert_eq!(body["expiresIn"], 3600);
    assert_eq!(body["userInfo"]["email"], "new.student@sdh.hs.kr");
    assert_eq!(body["userInfo"]["role"], "STUDENT");
    assert_eq!(body["userInfo"]["grade"], 1);
    assert_eq!(body["userInfo"]["classroom"], 1);
    assert_eq!(body["userInfo"]["studentNumber"], 1);

    // The returned tokens are our own, not Google's
    let access = body["accessToken"].as_str().unwrap();
    let refresh = body["refreshToken"].as_str().unwrap();
    assert_ne!(access, "ya29.mock-google-token");

    let account = store
        .find_by_email(Role::Student, "new.student@sdh.hs.kr")
        .unwrap()
        .expect("student account should exist after first login");

    let claims = tokens.extract_claims(access).unwrap();
    assert_eq!(claims.sub, account.id);
    assert_eq!(claims.role, Role::Student);
    assert_eq!(claims.kind, TokenKind::Access);
    assert_eq!(
        tokens.extract_claims(refresh).unwrap().kind,
        TokenKind::Refresh
    );
}

#[tokio::test]
async fn repeat_login_reuses_the_existing_account() {
    let google = mock_google("student@sdh.hs.kr", "sdh.hs.kr").await;
    let store = Arc::new(MemoryAccountStore::new());
    let config = test_config(&google.uri(), 3600);

    let (status, first) = post_callback(router(AppState::new(&config, store.clone())), "code-1").await;
    assert_eq!(status, StatusCode::OK);
    let (status, second) = post_callback(router(AppState::new(&config, store)), "code-2").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(first["userInfo"]["id"], second["userInfo"]["id"]);
}

#[tokio::test]
async fn foreign_domain_login_is_rejected_without_creating_an_account() {
    let google = mock_google("intruder@other.org", "other.org").await;
    let store = Arc::new(MemoryAccountStore::new());
    let state = AppState::new(&test_config(&google.uri(), 3600), store.clone());

    let (status, body) = post_callback(router(state), "auth-code-xyz").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "authentication_failed");
    // Failure detail stays server-side
    assert_eq!(body["error"], "Google authentication failed");
    assert!(store
        .find_by_email(Role::Student, "intruder@other.org")
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn expired_token_passes_public_routes_but_not_protected_ones() {
    let google = mock_google("student@sdh.hs.kr", "sdh.hs.kr").await;
    let store = Arc::new(MemoryAccountStore::new());
    // Zero-lifetime access tokens: issued already expired
    let state = AppState::new(&test_config(&google.uri(), 0), store);
    let tokens = state.tokens.clone();
    let app = router(state);

    let (status, body) = post_callback(app.clone(), "auth-code-abc").await;
    assert_eq!(status, StatusCode::OK);
    let access = body["accessToken"].as_str().unwrap().to_string();
    assert!(tokens.is_expired(&access));

    // Public route: expired credentials leave the request anonymous, not failed
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/auth/verify/validate?token={access}"))
                .header(header::AUTHORIZATION, format!("Bearer {access}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"false");

    // Protected route: same token is rejected
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/users/me")
                .header(header::AUTHORIZATION, format!("Bearer {access}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_survives_refresh_round_trip() {
    let google = mock_google("student@sdh.hs.kr", "sdh.hs.kr").await;
    let store = Arc::new(MemoryAccountStore::new());
    let state = AppState::new(&test_config(&google.uri(), 3600), store);
    let app = router(state);

    let (_, login) = post_callback(app.clone(), "auth-code-abc").await;
    let refresh = login["refreshToken"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/verify/refresh")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "refreshToken": refresh }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let new_access = body["accessToken"].as_str().unwrap();

    // The refreshed access token works on a protected route
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/users/me")
                .header(header::AUTHORIZATION, format!("Bearer {new_access}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let me: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(me["email"], "student@sdh.hs.kr");
}
