//! QR code entity and DTOs.
//!
//! Rows are owned by exactly one user; visibility is enforced by the
//! row-level-security policies on `qr_codes`, not by query filters.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use qrdeck_core::types::{DbId, Timestamp};

/// A saved QR code.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QrCode {
    pub id: DbId,
    pub user_id: DbId,
    /// One of the `QrKind` variants, stored as lowercase text.
    pub kind: String,
    pub title: Option<String>,
    pub content: String,
    /// Styling JSON (`QrStyle` shape), `NULL` for defaults.
    pub settings: Option<serde_json::Value>,
    pub is_favorite: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new QR code.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQrCode {
    pub kind: String,
    pub title: Option<String>,
    pub content: String,
    pub settings: Option<serde_json::Value>,
}

/// DTO for a partial update. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateQrCode {
    pub title: Option<String>,
    pub content: Option<String>,
    pub settings: Option<serde_json::Value>,
    pub is_favorite: Option<bool>,
}

/// Filter/pagination parameters for listing QR codes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QrCodeQuery {
    pub kind: Option<String>,
    pub favorite: Option<bool>,
    /// Case-insensitive substring match over title and content.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A page of QR codes plus the total count for pagination.
#[derive(Debug, Serialize)]
pub struct QrCodePage {
    pub items: Vec<QrCode>,
    pub total: i64,
}
