use axum::routing::post;
use axum::Router;

use crate::handlers::qr;
use crate::state::AppState;

/// Stateless QR routes mounted at `/qr`.
///
/// ```text
/// POST /generate  -> generate (render without saving)
/// POST /payload   -> build_payload
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(qr::generate))
        .route("/payload", post(qr::build_payload))
}
