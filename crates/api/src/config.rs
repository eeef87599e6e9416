//! Server configuration loaded from environment variables.

use chrono::Duration;
use qrdeck_core::session::RefreshPolicy;

/// Top-level server configuration.
///
/// All fields except the secrets have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Session JWT configuration.
    pub session: SessionConfig,
    /// OAuth provider endpoints and credentials.
    pub oauth: OAuthConfig,
    /// Emails granted the admin flag at sign-in (comma-separated
    /// `ADMIN_EMAILS`).
    pub admin_emails: Vec<String>,
    /// Age in days after which log rows are swept (default: `90`).
    pub log_retention_days: i64,
}

/// Session JWT signing and refresh-policy configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// HMAC-SHA256 secret used to sign session JWTs.
    pub secret: String,
    /// How close to access-token expiry a refresh may happen (seconds).
    pub refresh_threshold_secs: i64,
    /// Hard lifetime of the session JWT itself in days (default: `30`).
    pub session_ttl_days: i64,
}

/// OAuth provider configuration (authorization-code flow).
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub redirect_url: String,
}

/// Default session refresh threshold in seconds.
const DEFAULT_REFRESH_THRESHOLD_SECS: i64 = 300;
/// Default session JWT lifetime in days.
const DEFAULT_SESSION_TTL_DAYS: i64 = 30;
/// Default log retention in days.
const DEFAULT_LOG_RETENTION_DAYS: i64 = 90;

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Required | Default                 |
    /// |----------------------------------|----------|-------------------------|
    /// | `HOST`                           | no       | `0.0.0.0`               |
    /// | `PORT`                           | no       | `3000`                  |
    /// | `CORS_ORIGINS`                   | no       | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`           | no       | `30`                    |
    /// | `SESSION_SECRET`                 | **yes**  | --                      |
    /// | `SESSION_REFRESH_THRESHOLD_SECS` | no       | `300`                   |
    /// | `SESSION_TTL_DAYS`               | no       | `30`                    |
    /// | `OAUTH_CLIENT_ID`                | **yes**  | --                      |
    /// | `OAUTH_CLIENT_SECRET`            | **yes**  | --                      |
    /// | `OAUTH_AUTH_URL`                 | **yes**  | --                      |
    /// | `OAUTH_TOKEN_URL`                | **yes**  | --                      |
    /// | `OAUTH_USERINFO_URL`             | **yes**  | --                      |
    /// | `OAUTH_REDIRECT_URL`             | **yes**  | --                      |
    /// | `ADMIN_EMAILS`                   | no       | (empty)                 |
    /// | `LOG_RETENTION_DAYS`             | no       | `90`                    |
    ///
    /// # Panics
    ///
    /// Panics when a required variable is missing or a numeric variable
    /// fails to parse; misconfiguration should fail fast at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let admin_emails: Vec<String> = std::env::var("ADMIN_EMAILS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let log_retention_days: i64 = std::env::var("LOG_RETENTION_DAYS")
            .unwrap_or_else(|_| DEFAULT_LOG_RETENTION_DAYS.to_string())
            .parse()
            .expect("LOG_RETENTION_DAYS must be a valid i64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            session: SessionConfig::from_env(),
            oauth: OAuthConfig::from_env(),
            admin_emails,
            log_retention_days,
        }
    }

    /// Whether `email` is on the admin allowlist (case-insensitive).
    pub fn is_admin_email(&self, email: &str) -> bool {
        let email = email.to_lowercase();
        self.admin_emails.iter().any(|e| e == &email)
    }
}

impl SessionConfig {
    pub fn from_env() -> Self {
        let secret =
            std::env::var("SESSION_SECRET").expect("SESSION_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "SESSION_SECRET must not be empty");

        let refresh_threshold_secs: i64 = std::env::var("SESSION_REFRESH_THRESHOLD_SECS")
            .unwrap_or_else(|_| DEFAULT_REFRESH_THRESHOLD_SECS.to_string())
            .parse()
            .expect("SESSION_REFRESH_THRESHOLD_SECS must be a valid i64");

        let session_ttl_days: i64 = std::env::var("SESSION_TTL_DAYS")
            .unwrap_or_else(|_| DEFAULT_SESSION_TTL_DAYS.to_string())
            .parse()
            .expect("SESSION_TTL_DAYS must be a valid i64");

        Self {
            secret,
            refresh_threshold_secs,
            session_ttl_days,
        }
    }

    /// The refresh policy derived from this configuration.
    pub fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy {
            refresh_threshold: Duration::seconds(self.refresh_threshold_secs),
        }
    }
}

impl OAuthConfig {
    pub fn from_env() -> Self {
        let required = |var: &str| -> String {
            std::env::var(var).unwrap_or_else(|_| panic!("{var} must be set in the environment"))
        };
        Self {
            client_id: required("OAUTH_CLIENT_ID"),
            client_secret: required("OAUTH_CLIENT_SECRET"),
            auth_url: required("OAUTH_AUTH_URL"),
            token_url: required("OAUTH_TOKEN_URL"),
            userinfo_url: required("OAUTH_USERINFO_URL"),
            redirect_url: required("OAUTH_REDIRECT_URL"),
        }
    }
}
