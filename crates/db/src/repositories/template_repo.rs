//! Repository for the `qr_templates` table.
//!
//! Like `QrCodeRepo`, all methods run on an RLS-scoped connection. Setting a
//! template as default clears the flag on the user's other rows inside the
//! same transaction, so at most one default per user survives any sequence
//! of operations. A partial unique index backs this up at the schema level.

use sqlx::{Connection, PgConnection};

use qrdeck_core::types::DbId;

use crate::models::template::{CreateTemplate, QrTemplate, UpdateTemplate};

const COLUMNS: &str = "id, user_id, name, settings, is_default, created_at, updated_at";

/// Provides CRUD operations for styling templates.
pub struct TemplateRepo;

impl TemplateRepo {
    /// Insert a new template owned by `user_id`.
    ///
    /// When `input.is_default` is set, the user's existing default is
    /// cleared in the same transaction.
    pub async fn create(
        conn: &mut PgConnection,
        user_id: DbId,
        input: &CreateTemplate,
    ) -> Result<QrTemplate, sqlx::Error> {
        let mut tx = conn.begin().await?;

        if input.is_default {
            clear_default(&mut tx, user_id).await?;
        }

        let query = format!(
            "INSERT INTO qr_templates (user_id, name, settings, is_default) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let template = sqlx::query_as::<_, QrTemplate>(&query)
            .bind(user_id)
            .bind(&input.name)
            .bind(&input.settings)
            .bind(input.is_default)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(template)
    }

    /// Find a template by ID (subject to the active RLS context).
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<QrTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM qr_templates WHERE id = $1");
        sqlx::query_as::<_, QrTemplate>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List visible templates, default first, then by name.
    pub async fn list(conn: &mut PgConnection) -> Result<Vec<QrTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM qr_templates ORDER BY is_default DESC, name ASC"
        );
        sqlx::query_as::<_, QrTemplate>(&query).fetch_all(conn).await
    }

    /// Partial update. Setting `is_default = true` clears the flag on the
    /// owner's other templates in the same transaction.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateTemplate,
    ) -> Result<Option<QrTemplate>, sqlx::Error> {
        let mut tx = conn.begin().await?;

        if input.is_default == Some(true) {
            // Resolve the owner first; the row may not be visible at all.
            let owner: Option<DbId> =
                sqlx::query_scalar("SELECT user_id FROM qr_templates WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?;
            match owner {
                Some(user_id) => clear_default(&mut tx, user_id).await?,
                None => {
                    tx.rollback().await?;
                    return Ok(None);
                }
            }
        }

        let query = format!(
            "UPDATE qr_templates SET \
                name = COALESCE($2, name), \
                settings = COALESCE($3, settings), \
                is_default = COALESCE($4, is_default), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let template = sqlx::query_as::<_, QrTemplate>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.settings)
            .bind(input.is_default)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(template)
    }

    /// Delete a template. Returns true when a row was removed.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM qr_templates WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The user's default template, if any.
    pub async fn find_default(
        conn: &mut PgConnection,
    ) -> Result<Option<QrTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM qr_templates WHERE is_default LIMIT 1");
        sqlx::query_as::<_, QrTemplate>(&query).fetch_optional(conn).await
    }
}

/// Clear the default flag on all of `user_id`'s templates.
async fn clear_default(tx: &mut sqlx::PgTransaction<'_>, user_id: DbId) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE qr_templates SET is_default = false WHERE user_id = $1 AND is_default")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
