use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Admin log console routes mounted at `/admin`. All require the admin flag.
///
/// ```text
/// GET  /logs          -> list_logs
/// GET  /logs/stats    -> log_stats
/// GET  /logs/export   -> export_logs
/// POST /logs/cleanup  -> cleanup_logs
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/logs", get(admin::list_logs))
        .route("/logs/stats", get(admin::log_stats))
        .route("/logs/export", get(admin::export_logs))
        .route("/logs/cleanup", post(admin::cleanup_logs))
}
