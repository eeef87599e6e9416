use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use qrdeck_core::types::{DbId, Timestamp};

/// A reusable styling template. At most one per user may be the default.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QrTemplate {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub settings: serde_json::Value,
    pub is_default: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new template.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplate {
    pub name: String,
    pub settings: serde_json::Value,
    #[serde(default)]
    pub is_default: bool,
}

/// DTO for a partial template update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTemplate {
    pub name: Option<String>,
    pub settings: Option<serde_json::Value>,
    pub is_default: Option<bool>,
}
