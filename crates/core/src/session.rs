//! Session token lifecycle state machine.
//!
//! Every session carries the OAuth provider's tokens plus a `remember_me`
//! flag. On each validation the token set is evaluated against a refresh
//! policy and yields exactly one decision: keep using the tokens, attempt a
//! single refresh against the provider, or expire terminally. Only
//! `remember_me` sessions ever attempt a refresh; everything else simply
//! expires at `access_token_expires`.
//!
//! There is no retry or backoff: a failed refresh tags the token set with a
//! terminal error that the client is expected to react to by signing out.
//! The server never force-terminates a session itself.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Terminal session error, surfaced to the client verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionError {
    /// A `remember_me = false` session reached its access-token expiry.
    AccessTokenExpired,
    /// Refresh was required but the refresh token was missing, expired, or
    /// the provider rejected the refresh call.
    RefreshAccessTokenError,
}

impl SessionError {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionError::AccessTokenExpired => "AccessTokenExpired",
            SessionError::RefreshAccessTokenError => "RefreshAccessTokenError",
        }
    }
}

/// The provider tokens carried inside a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub access_token_expires: Timestamp,
    pub refresh_token_expires: Option<Timestamp>,
    pub remember_me: bool,
    /// Terminal error tag. Once set the session never recovers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SessionError>,
}

/// Refresh policy: how close to expiry a `remember_me` session may be
/// refreshed proactively.
#[derive(Debug, Clone, Copy)]
pub struct RefreshPolicy {
    pub refresh_threshold: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            refresh_threshold: Duration::seconds(300),
        }
    }
}

/// Outcome of evaluating a token set at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionDecision {
    /// Token is fresh; use as is.
    UseAsIs,
    /// Within the refresh window (or past expiry) with a live refresh
    /// token; the caller should make exactly one refresh attempt.
    AttemptRefresh,
    /// Terminal. The session carries this error from now on.
    Expire(SessionError),
}

/// Tokens returned by the provider's refresh-token grant.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshedTokens {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    /// A replacement refresh token, if the provider rotated it.
    pub refresh_token: Option<String>,
    /// Lifetime of the replacement refresh token in seconds, if any.
    pub refresh_token_expires_in: Option<i64>,
}

impl TokenSet {
    /// Evaluate this token set at `now` under `policy`.
    pub fn evaluate(&self, now: Timestamp, policy: &RefreshPolicy) -> SessionDecision {
        // A tagged session stays expired.
        if let Some(err) = self.error {
            return SessionDecision::Expire(err);
        }

        if now < self.access_token_expires - policy.refresh_threshold {
            return SessionDecision::UseAsIs;
        }

        if !self.remember_me {
            // Non-remembered sessions never refresh: inside the threshold
            // window they keep running, at expiry they terminate.
            if now >= self.access_token_expires {
                return SessionDecision::Expire(SessionError::AccessTokenExpired);
            }
            return SessionDecision::UseAsIs;
        }

        match (&self.refresh_token, self.refresh_token_expires) {
            (Some(_), Some(refresh_expires)) if now < refresh_expires => {
                SessionDecision::AttemptRefresh
            }
            // No expiry known for the refresh token: trust it.
            (Some(_), None) => SessionDecision::AttemptRefresh,
            _ => SessionDecision::Expire(SessionError::RefreshAccessTokenError),
        }
    }

    /// Apply a successful refresh response.
    ///
    /// Replaces the access token and its expiry; the refresh token is
    /// replaced only when the provider returned a new one.
    pub fn apply_refresh(&mut self, refreshed: RefreshedTokens, now: Timestamp) {
        self.access_token = refreshed.access_token;
        self.access_token_expires = now + Duration::seconds(refreshed.expires_in);

        if let Some(new_refresh) = refreshed.refresh_token {
            self.refresh_token = Some(new_refresh);
            if let Some(secs) = refreshed.refresh_token_expires_in {
                self.refresh_token_expires = Some(now + Duration::seconds(secs));
            }
        }
    }

    /// Tag this token set after a failed refresh attempt. Terminal.
    pub fn mark_refresh_failed(&mut self) {
        self.error = Some(SessionError::RefreshAccessTokenError);
    }

    /// Tag this token set as expired. Terminal.
    pub fn mark_expired(&mut self, err: SessionError) {
        self.error = Some(err);
    }
}
