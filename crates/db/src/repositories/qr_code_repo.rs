//! Repository for the `qr_codes` table.
//!
//! Every method takes `&mut PgConnection` and expects the caller to have
//! scoped the connection with [`crate::rls::with_user_context`]; the
//! row-level-security policies on `qr_codes` do the per-user filtering, so
//! no query here filters by `user_id` explicitly.

use sqlx::PgConnection;

use qrdeck_core::types::DbId;

use crate::models::qr_code::{CreateQrCode, QrCode, QrCodeQuery, UpdateQrCode};

const COLUMNS: &str = "id, user_id, kind, title, content, settings, \
     is_favorite, created_at, updated_at";

/// Provides CRUD operations for saved QR codes.
pub struct QrCodeRepo;

impl QrCodeRepo {
    /// Insert a new QR code owned by `user_id`, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        user_id: DbId,
        input: &CreateQrCode,
    ) -> Result<QrCode, sqlx::Error> {
        let query = format!(
            "INSERT INTO qr_codes (user_id, kind, title, content, settings) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QrCode>(&query)
            .bind(user_id)
            .bind(&input.kind)
            .bind(&input.title)
            .bind(&input.content)
            .bind(&input.settings)
            .fetch_one(conn)
            .await
    }

    /// Find a QR code by ID (subject to the active RLS context).
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<QrCode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM qr_codes WHERE id = $1");
        sqlx::query_as::<_, QrCode>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List visible QR codes, newest first, with filters and pagination.
    pub async fn list(
        conn: &mut PgConnection,
        params: &QrCodeQuery,
    ) -> Result<Vec<QrCode>, sqlx::Error> {
        let limit = params.limit.unwrap_or(50).clamp(0, 200);
        let offset = params.offset.unwrap_or(0).max(0);

        let query = format!(
            "SELECT {COLUMNS} FROM qr_codes \
             WHERE ($1::TEXT IS NULL OR kind = $1) \
               AND ($2::BOOLEAN IS NULL OR is_favorite = $2) \
               AND ($3::TEXT IS NULL OR title ILIKE $3 OR content ILIKE $3) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, QrCode>(&query)
            .bind(&params.kind)
            .bind(params.favorite)
            .bind(params.search.as_ref().map(|s| format!("%{s}%")))
            .bind(limit)
            .bind(offset)
            .fetch_all(conn)
            .await
    }

    /// Count visible QR codes matching the same filters as [`Self::list`].
    pub async fn count(
        conn: &mut PgConnection,
        params: &QrCodeQuery,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM qr_codes \
             WHERE ($1::TEXT IS NULL OR kind = $1) \
               AND ($2::BOOLEAN IS NULL OR is_favorite = $2) \
               AND ($3::TEXT IS NULL OR title ILIKE $3 OR content ILIKE $3)",
        )
        .bind(&params.kind)
        .bind(params.favorite)
        .bind(params.search.as_ref().map(|s| format!("%{s}%")))
        .fetch_one(conn)
        .await
    }

    /// Partial update. Only non-`None` fields are applied.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateQrCode,
    ) -> Result<Option<QrCode>, sqlx::Error> {
        let query = format!(
            "UPDATE qr_codes SET \
                title = COALESCE($2, title), \
                content = COALESCE($3, content), \
                settings = COALESCE($4, settings), \
                is_favorite = COALESCE($5, is_favorite), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QrCode>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.content)
            .bind(&input.settings)
            .bind(input.is_favorite)
            .fetch_optional(conn)
            .await
    }

    /// Flip the favorite flag, returning the updated row.
    pub async fn toggle_favorite(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<QrCode>, sqlx::Error> {
        let query = format!(
            "UPDATE qr_codes SET is_favorite = NOT is_favorite, updated_at = now() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QrCode>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Delete a QR code. Returns true when a row was removed.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM qr_codes WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List every visible QR code, newest first (used by export).
    pub async fn list_all(conn: &mut PgConnection) -> Result<Vec<QrCode>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM qr_codes ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, QrCode>(&query).fetch_all(conn).await
    }
}
