//! HTTP access logging middleware.
//!
//! Records one ACCESS log row per request after the response is produced.
//! The write runs in a spawned task so the response is never delayed by
//! the log insert, and insert failures are swallowed by the logging layer.

use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use qrdeck_core::log::{LogLevel, LogType};
use qrdeck_db::models::NewAppLog;

use crate::auth::jwt::decode_session;
use crate::logging;
use crate::state::AppState;

/// Axum middleware entry point. Install with
/// `axum::middleware::from_fn_with_state(state, access_log)`.
pub async fn access_log(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let ip = client_ip(&request);
    let user_agent = header_value(&request, "user-agent");
    let user_id = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|token| decode_session(token, &state.config.session).ok())
        .map(|claims| claims.sub);

    let start = Instant::now();
    let response = next.run(request).await;
    let status = response.status().as_u16();
    let latency_ms = start.elapsed().as_millis() as u64;

    let level = if status >= 500 {
        LogLevel::Error
    } else if status >= 400 {
        LogLevel::Warn
    } else {
        LogLevel::Info
    };

    let mut entry = NewAppLog::new(
        LogType::Access,
        "request",
        format!("{method} {path} -> {status}"),
    )
    .level(level)
    .metadata(serde_json::json!({
        "method": method,
        "path": path,
        "status": status,
        "latency_ms": latency_ms,
    }))
    .request_info(ip, user_agent);
    if let Some(user_id) = user_id {
        entry = entry.user(user_id);
    }

    let pool = state.pool.clone();
    tokio::spawn(async move {
        logging::write(&pool, entry).await;
    });

    response
}

/// Best-effort client IP: `x-forwarded-for` (first hop) then `x-real-ip`.
fn client_ip(request: &Request) -> Option<String> {
    if let Some(forwarded) = header_value(request, "x-forwarded-for") {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return Some(first.to_string());
            }
        }
    }
    header_value(request, "x-real-ip")
}

fn header_value(request: &Request, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
