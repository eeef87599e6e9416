//! Session JWT encoding and validation.
//!
//! Sessions are stateless: an HS256-signed JWT minted by this service
//! carries the user's identity plus the OAuth provider's tokens as a
//! [`TokenSet`]. Nothing is persisted server-side; the session endpoint
//! re-evaluates and re-mints the JWT as tokens refresh or expire.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use qrdeck_core::session::TokenSet;
use qrdeck_core::types::DbId;

use crate::config::SessionConfig;

/// Claims embedded in every session JWT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    pub email: String,
    pub display_name: Option<String>,
    /// Whether the user was on the admin allowlist at sign-in.
    pub is_admin: bool,
    /// The OAuth provider's tokens and the remember-me flag.
    pub tokens: TokenSet,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Hard expiration of the JWT itself (UTC Unix timestamp).
    pub exp: i64,
}

/// Sign a session JWT for the given claims payload.
///
/// `iat`/`exp` are stamped here; callers only supply identity and tokens.
pub fn encode_session(
    user_id: DbId,
    email: &str,
    display_name: Option<&str>,
    is_admin: bool,
    tokens: TokenSet,
    config: &SessionConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let exp = now + config.session_ttl_days * 86_400;

    let claims = SessionClaims {
        sub: user_id,
        email: email.to_string(),
        display_name: display_name.map(str::to_string),
        is_admin,
        tokens,
        iat: now,
        exp,
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode a session JWT, returning the embedded [`SessionClaims`].
///
/// Validates the signature and the JWT's own hard expiry; the token-set
/// lifecycle (access-token expiry, refresh) is evaluated separately.
pub fn decode_session(
    token: &str,
    config: &SessionConfig,
) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}
