//! Shared harness for HTTP-level integration tests.
//!
//! Builds the full application router with the same middleware stack as
//! `main.rs`, backed by a per-test database from `#[sqlx::test]`. The OAuth
//! endpoints point at an unroutable address, so any refresh attempt fails
//! the way a dead provider would.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use qrdeck_api::auth::jwt::encode_session;
use qrdeck_api::auth::oauth::OAuthClient;
use qrdeck_api::config::{OAuthConfig, ServerConfig, SessionConfig};
use qrdeck_api::state::AppState;
use qrdeck_api::{middleware, routes};
use qrdeck_core::session::TokenSet;
use qrdeck_db::models::{UpsertUser, User};
use qrdeck_db::repositories::UserRepo;

/// Build a test `ServerConfig` with safe defaults.
///
/// The OAuth token endpoint is unroutable on purpose: tests that trigger a
/// refresh observe the failure path without any network dependency.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        session: SessionConfig {
            secret: "integration-test-secret".to_string(),
            refresh_threshold_secs: 300,
            session_ttl_days: 30,
        },
        oauth: OAuthConfig {
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string(),
            auth_url: "http://127.0.0.1:9/authorize".to_string(),
            token_url: "http://127.0.0.1:9/token".to_string(),
            userinfo_url: "http://127.0.0.1:9/userinfo".to_string(),
            redirect_url: "http://localhost:5173/auth/callback".to_string(),
        },
        admin_emails: vec!["admin@test.com".to_string()],
        log_retention_days: 90,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (access log, CORS, request ID,
/// timeout, tracing, panic recovery) that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();

    let state = AppState {
        pool,
        oauth: Arc::new(OAuthClient::new(config.oauth.clone())),
        config: Arc::new(config),
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::access_log::access_log,
        ))
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Users and sessions
// ---------------------------------------------------------------------------

/// Insert a user directly, the way the OAuth callback would.
pub async fn create_user(pool: &PgPool, email: &str, is_admin: bool) -> User {
    UserRepo::upsert(
        pool,
        &UpsertUser {
            email: email.to_string(),
            display_name: Some("Test User".to_string()),
            provider: "oauth".to_string(),
            provider_account_id: format!("acct-{email}"),
            is_admin,
        },
    )
    .await
    .expect("user upsert should succeed")
}

/// A healthy token set: access token valid for an hour, refresh for 30 days.
pub fn fresh_tokens(remember_me: bool) -> TokenSet {
    let now = chrono::Utc::now();
    TokenSet {
        access_token: "provider-access".to_string(),
        refresh_token: Some("provider-refresh".to_string()),
        access_token_expires: now + chrono::Duration::hours(1),
        refresh_token_expires: Some(now + chrono::Duration::days(30)),
        remember_me,
        error: None,
    }
}

/// A token set whose access token already lapsed.
pub fn expired_tokens(remember_me: bool) -> TokenSet {
    let now = chrono::Utc::now();
    TokenSet {
        access_token: "provider-access".to_string(),
        refresh_token: Some("provider-refresh".to_string()),
        access_token_expires: now - chrono::Duration::minutes(5),
        refresh_token_expires: Some(now + chrono::Duration::days(30)),
        remember_me,
        error: None,
    }
}

/// Mint a session JWT for `user` carrying `tokens`.
pub fn session_token(user: &User, tokens: TokenSet) -> String {
    encode_session(
        user.id,
        &user.email,
        user.display_name.as_deref(),
        user.is_admin,
        tokens,
        &test_config().session,
    )
    .expect("session signing should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str, token: Option<&str>) -> Response {
    send(app, Method::GET, uri, token, None).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response {
    send(app, Method::POST, uri, token, Some(body)).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response {
    send(app, Method::PUT, uri, token, Some(body)).await
}

pub async fn delete(app: Router, uri: &str, token: Option<&str>) -> Response {
    send(app, Method::DELETE, uri, token, None).await
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.expect("request should complete")
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}
