use std::sync::Arc;

use crate::auth::oauth::OAuthClient;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: qrdeck_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// OAuth provider client (code exchange, refresh grant, userinfo).
    pub oauth: Arc<OAuthClient>,
}
