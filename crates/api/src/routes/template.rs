use axum::routing::get;
use axum::Router;

use crate::handlers::template;
use crate::state::AppState;

/// Template routes mounted at `/templates`.
///
/// `/default` is registered before `/{id}` so it never parses as an id.
///
/// ```text
/// GET    /          -> list
/// POST   /          -> create
/// GET    /default   -> get_default
/// GET    /{id}      -> get
/// PUT    /{id}      -> update
/// DELETE /{id}      -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(template::list).post(template::create))
        .route("/default", get(template::get_default))
        .route(
            "/{id}",
            get(template::get)
                .put(template::update)
                .delete(template::delete),
        )
}
