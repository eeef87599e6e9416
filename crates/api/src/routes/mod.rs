pub mod admin;
pub mod auth;
pub mod health;
pub mod qr;
pub mod qr_code;
pub mod template;
pub mod transfer;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                      start OAuth flow (public)
/// /auth/callback                   OAuth redirect target (public)
/// /auth/session                    evaluate/refresh session
/// /auth/logout                     sign out (POST)
///
/// /qr/generate                     render ad-hoc QR image (POST)
/// /qr/payload                      build typed payload string (POST)
///
/// /qr-codes                        list, create
/// /qr-codes/{id}                   get, update, delete
/// /qr-codes/{id}/favorite          toggle favorite (POST)
/// /qr-codes/{id}/image             render saved code (GET)
///
/// /templates                       list, create
/// /templates/default               user's default template (GET)
/// /templates/{id}                  get, update, delete
///
/// /transfer/export                 export codes + templates (GET)
/// /transfer/import                 import a document (POST)
///
/// /admin/logs                      query logs (admin only)
/// /admin/logs/stats                aggregate statistics
/// /admin/logs/export               export entries as JSON
/// /admin/logs/cleanup              batched manual cleanup (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // OAuth sign-in and session lifecycle.
        .nest("/auth", auth::router())
        // Stateless rendering and payload building.
        .nest("/qr", qr::router())
        // Saved QR codes (RLS-scoped).
        .nest("/qr-codes", qr_code::router())
        // Styling templates (RLS-scoped).
        .nest("/templates", template::router())
        // JSON export/import.
        .nest("/transfer", transfer::router())
        // Admin log console.
        .nest("/admin", admin::router())
}
