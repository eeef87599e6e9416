//! Handlers for the OAuth sign-in flow and session lifecycle.
//!
//! The session is a stateless JWT carrying the provider's tokens. The
//! `/auth/session` endpoint is the heart of the lifecycle: on every call it
//! evaluates the embedded token set, performs at most one refresh attempt
//! against the provider, and re-mints the JWT with the outcome. Terminal
//! states come back as a 200 with an `error` tag so the client can react by
//! signing the user out, rather than as a transport-level failure.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use qrdeck_core::error::CoreError;
use qrdeck_core::session::{SessionDecision, TokenSet};
use qrdeck_core::types::{DbId, Timestamp};
use qrdeck_db::models::UpsertUser;
use qrdeck_db::repositories::UserRepo;

use crate::auth::jwt::{decode_session, encode_session, SessionClaims};
use crate::error::{AppError, AppResult};
use crate::logging;
use crate::response::DataResponse;
use crate::state::AppState;

/// Provider name recorded on user rows. A single provider is configured at
/// a time; the account key is `(provider, provider_account_id)`.
const PROVIDER: &str = "oauth";

#[derive(Debug, Deserialize)]
pub struct LoginParams {
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Provider authorization URL the client should navigate to.
    pub authorize_url: String,
    /// CSRF state nonce the callback must echo back.
    pub state: String,
}

/// GET /api/v1/auth/login
///
/// Start the OAuth flow: returns the provider authorization URL and a
/// fresh state nonce.
pub async fn login(
    State(state): State<AppState>,
    Query(_params): Query<LoginParams>,
) -> AppResult<impl IntoResponse> {
    let nonce = uuid::Uuid::new_v4().to_string();
    let authorize_url = state.oauth.authorize_url(&nonce);

    Ok(Json(DataResponse {
        data: LoginResponse {
            authorize_url,
            state: nonce,
        },
    }))
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: DbId,
    pub email: String,
    pub display_name: Option<String>,
    pub is_admin: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// The (possibly re-minted) session JWT.
    pub token: String,
    pub user: SessionUser,
    /// Provider access-token expiry; the client refreshes via
    /// `/auth/session` as this approaches.
    pub expires: Timestamp,
    /// Terminal error tag (`AccessTokenExpired` or
    /// `RefreshAccessTokenError`). Absent for a healthy session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

/// GET /api/v1/auth/callback
///
/// OAuth redirect target: exchanges the authorization code, fetches the
/// provider profile, upserts the user, and mints the session JWT.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> AppResult<impl IntoResponse> {
    let now = chrono::Utc::now();
    let granted = state.oauth.exchange_code(&params.code).await?;
    let profile = state.oauth.userinfo(&granted.access_token).await?;

    let user = UserRepo::upsert(
        &state.pool,
        &UpsertUser {
            email: profile.email.clone(),
            display_name: profile.name.clone(),
            provider: PROVIDER.to_string(),
            provider_account_id: profile.sub.clone(),
            is_admin: state.config.is_admin_email(&profile.email),
        },
    )
    .await?;

    let tokens = TokenSet {
        access_token: granted.access_token,
        refresh_token: granted.refresh_token,
        access_token_expires: now + chrono::Duration::seconds(granted.expires_in),
        refresh_token_expires: granted
            .refresh_token_expires_in
            .map(|secs| now + chrono::Duration::seconds(secs)),
        remember_me: params.remember_me,
        error: None,
    };
    let expires = tokens.access_token_expires;

    let token = encode_session(
        user.id,
        &user.email,
        user.display_name.as_deref(),
        user.is_admin,
        tokens,
        &state.config.session,
    )
    .map_err(|e| AppError::InternalError(format!("failed to sign session token: {e}")))?;

    logging::auth_event(
        &state.pool,
        user.id,
        "sign_in",
        format!("User {} signed in (remember_me={})", user.email, params.remember_me),
    )
    .await;

    tracing::info!(user_id = user.id, remember_me = params.remember_me, "User signed in");

    Ok(Json(DataResponse {
        data: SessionResponse {
            token,
            user: SessionUser {
                id: user.id,
                email: user.email,
                display_name: user.display_name,
                is_admin: user.is_admin,
            },
            expires,
            error: None,
        },
    }))
}

/// GET /api/v1/auth/session
///
/// Evaluate and refresh the current session.
///
/// The bearer JWT is decoded (signature and JWT expiry must hold), its
/// token set is evaluated, and at most one refresh attempt is made. The
/// response always carries a re-minted JWT reflecting the new state; a
/// terminal session is still a 200, distinguished by the `error` tag.
pub async fn session(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> AppResult<impl IntoResponse> {
    let token = bearer_token(&headers)?;
    let claims = decode_session(token, &state.config.session).map_err(|_| {
        AppError::Core(CoreError::Unauthorized("Invalid or expired session".into()))
    })?;

    let now = chrono::Utc::now();
    let mut tokens = claims.tokens.clone();
    let policy = state.config.session.refresh_policy();

    match tokens.evaluate(now, &policy) {
        SessionDecision::UseAsIs => {}
        SessionDecision::AttemptRefresh => {
            // refresh_token is present whenever evaluate() says refresh
            let refresh_token = tokens.refresh_token.clone().unwrap_or_default();
            match state.oauth.refresh(&refresh_token).await {
                Ok(refreshed) => {
                    tokens.apply_refresh(refreshed, now);
                    logging::auth_event(
                        &state.pool,
                        claims.sub,
                        "token_refresh",
                        "Provider access token refreshed",
                    )
                    .await;
                }
                Err(err) => {
                    tracing::warn!(user_id = claims.sub, error = %err, "Token refresh failed");
                    tokens.mark_refresh_failed();
                    logging::auth_event(
                        &state.pool,
                        claims.sub,
                        "token_refresh_failed",
                        format!("Provider refresh failed: {err}"),
                    )
                    .await;
                }
            }
        }
        SessionDecision::Expire(err) => {
            tokens.mark_expired(err);
        }
    }

    let error = tokens.error.map(|e| e.as_str());
    let expires = tokens.access_token_expires;
    let reminted = remint(&state, &claims, tokens)?;

    Ok(Json(DataResponse {
        data: SessionResponse {
            token: reminted,
            user: SessionUser {
                id: claims.sub,
                email: claims.email,
                display_name: claims.display_name,
                is_admin: claims.is_admin,
            },
            expires,
            error,
        },
    }))
}

/// POST /api/v1/auth/logout
///
/// Sessions are stateless, so logout only records the event; the client
/// discards the JWT.
pub async fn logout(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> AppResult<impl IntoResponse> {
    if let Ok(token) = bearer_token(&headers) {
        if let Ok(claims) = decode_session(token, &state.config.session) {
            logging::auth_event(&state.pool, claims.sub, "sign_out", "User signed out").await;
            tracing::info!(user_id = claims.sub, "User signed out");
        }
    }
    Ok(StatusCode::NO_CONTENT)
}

fn bearer_token(headers: &axum::http::HeaderMap) -> Result<&str, AppError> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing Authorization header".into(),
            ))
        })
}

fn remint(state: &AppState, claims: &SessionClaims, tokens: TokenSet) -> Result<String, AppError> {
    encode_session(
        claims.sub,
        &claims.email,
        claims.display_name.as_deref(),
        claims.is_admin,
        tokens,
        &state.config.session,
    )
    .map_err(|e| AppError::InternalError(format!("failed to sign session token: {e}")))
}
