use serde::Serialize;
use sqlx::FromRow;

use qrdeck_core::types::{DbId, Timestamp};

/// An account created from an OAuth sign-in.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub display_name: Option<String>,
    pub provider: String,
    pub provider_account_id: String,
    pub is_admin: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for upserting a user on sign-in, keyed on
/// `(provider, provider_account_id)`.
#[derive(Debug, Clone)]
pub struct UpsertUser {
    pub email: String,
    pub display_name: Option<String>,
    pub provider: String,
    pub provider_account_id: String,
    pub is_admin: bool,
}
