use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Authentication routes mounted at `/auth`.
///
/// ```text
/// GET  /login     -> login (public)
/// GET  /callback  -> callback (public)
/// GET  /session   -> session
/// POST /logout    -> logout
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login))
        .route("/callback", get(auth::callback))
        .route("/session", get(auth::session))
        .route("/logout", post(auth::logout))
}
