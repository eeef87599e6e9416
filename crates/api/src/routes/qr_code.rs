use axum::routing::{get, post};
use axum::Router;

use crate::handlers::qr_code;
use crate::state::AppState;

/// Saved QR code routes mounted at `/qr-codes`.
///
/// ```text
/// GET    /               -> list
/// POST   /               -> create
/// GET    /{id}           -> get
/// PUT    /{id}           -> update
/// DELETE /{id}           -> delete
/// POST   /{id}/favorite  -> toggle_favorite
/// GET    /{id}/image     -> image (raw bytes)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(qr_code::list).post(qr_code::create))
        .route(
            "/{id}",
            get(qr_code::get)
                .put(qr_code::update)
                .delete(qr_code::delete),
        )
        .route("/{id}/favorite", post(qr_code::toggle_favorite))
        .route("/{id}/image", get(qr_code::image))
}
