//! HTTP client for the OAuth 2.0 authorization-code flow.
//!
//! The provider is generic: any endpoint trio (authorize, token, userinfo)
//! configured via [`OAuthConfig`] works, as long as the token endpoint
//! speaks standard form-encoded grants and userinfo returns JSON with a
//! subject id and email.

use serde::Deserialize;

use qrdeck_core::session::RefreshedTokens;

use crate::config::OAuthConfig;

/// Errors from talking to the OAuth provider.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// Network-level or deserialization failure.
    #[error("OAuth request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("OAuth provider returned {status}: {body}")]
    Provider {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The provider's response was missing a required field.
    #[error("OAuth response missing field: {0}")]
    MissingField(&'static str),
}

/// Token response from the provider's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Seconds until the access token expires.
    expires_in: i64,
    refresh_token: Option<String>,
    /// Seconds until the refresh token expires, when the provider reports it.
    refresh_token_expires_in: Option<i64>,
}

/// User profile from the provider's userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderUser {
    /// Stable subject identifier at the provider.
    #[serde(alias = "id")]
    pub sub: String,
    pub email: String,
    pub name: Option<String>,
}

/// Client for the configured OAuth provider.
pub struct OAuthClient {
    http: reqwest::Client,
    config: OAuthConfig,
}

impl OAuthClient {
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Build the provider authorization URL for the browser redirect.
    ///
    /// `state` is an opaque CSRF nonce the callback must echo back.
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&scope=openid%20email%20profile&state={}",
            self.config.auth_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_url),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<RefreshedTokens, OAuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &self.config.redirect_url),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
        ];
        self.token_request(&params).await
    }

    /// Redeem a refresh token for a new access token.
    ///
    /// The provider may or may not rotate the refresh token; the returned
    /// [`RefreshedTokens`] carries `refresh_token: None` when it did not.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, OAuthError> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
        ];
        self.token_request(&params).await
    }

    /// Fetch the signed-in user's profile with a provider access token.
    pub async fn userinfo(&self, access_token: &str) -> Result<ProviderUser, OAuthError> {
        let response = self
            .http
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthError::Provider { status, body });
        }

        Ok(response.json::<ProviderUser>().await?)
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> Result<RefreshedTokens, OAuthError> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthError::Provider { status, body });
        }

        let token: TokenResponse = response.json().await?;
        if token.access_token.is_empty() {
            return Err(OAuthError::MissingField("access_token"));
        }

        Ok(RefreshedTokens {
            access_token: token.access_token,
            expires_in: token.expires_in,
            refresh_token: token.refresh_token,
            refresh_token_expires_in: token.refresh_token_expires_in,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OAuthClient {
        OAuthClient::new(OAuthConfig {
            client_id: "client id".into(),
            client_secret: "secret".into(),
            auth_url: "https://provider.test/authorize".into(),
            token_url: "https://provider.test/token".into(),
            userinfo_url: "https://provider.test/userinfo".into(),
            redirect_url: "https://app.test/auth/callback".into(),
        })
    }

    #[test]
    fn authorize_url_encodes_parameters() {
        let url = client().authorize_url("abc/123");

        assert!(url.starts_with("https://provider.test/authorize?response_type=code"));
        assert!(url.contains("client_id=client%20id"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fapp.test%2Fauth%2Fcallback"));
        assert!(url.contains("state=abc%2F123"));
    }
}
