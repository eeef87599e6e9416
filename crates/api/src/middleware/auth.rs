//! Session-JWT authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use qrdeck_core::error::CoreError;
use qrdeck_core::types::DbId;

use crate::auth::jwt::decode_session;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from a session JWT Bearer token in the
/// `Authorization` header.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    pub email: String,
    pub is_admin: bool,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = decode_session(token, &state.config.session).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired session".into()))
        })?;

        // A session carrying a refresh error, or whose provider access token
        // already lapsed, must not authorize API calls. The session endpoint
        // is where the client goes to refresh.
        if claims.tokens.error.is_some() {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Session expired, sign in again".into(),
            )));
        }
        if chrono::Utc::now() >= claims.tokens.access_token_expires {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Access token expired, refresh the session".into(),
            )));
        }

        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
            is_admin: claims.is_admin,
        })
    }
}
