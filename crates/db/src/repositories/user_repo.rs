//! Repository for the `users` table.

use sqlx::PgPool;

use qrdeck_core::types::DbId;

use crate::models::user::{UpsertUser, User};

const COLUMNS: &str = "id, email, display_name, provider, provider_account_id, \
     is_admin, created_at, updated_at";

/// Provides lookup and upsert operations for OAuth-backed accounts.
pub struct UserRepo;

impl UserRepo {
    /// Upsert a user on sign-in, keyed on `(provider, provider_account_id)`.
    ///
    /// Email, display name, and the admin flag are refreshed on every
    /// sign-in so allowlist changes take effect at the next login.
    pub async fn upsert(pool: &PgPool, input: &UpsertUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, display_name, provider, provider_account_id, is_admin) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (provider, provider_account_id) DO UPDATE SET \
                email = EXCLUDED.email, \
                display_name = EXCLUDED.display_name, \
                is_admin = EXCLUDED.is_admin, \
                updated_at = now() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.display_name)
            .bind(&input.provider)
            .bind(&input.provider_account_id)
            .bind(input.is_admin)
            .fetch_one(pool)
            .await
    }

    /// Find a user by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }
}
