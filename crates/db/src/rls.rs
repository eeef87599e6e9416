//! Row-level-security context manager.
//!
//! The `qr_codes` and `qr_templates` policies key on two per-connection
//! settings: `app.current_user_id` and `app.is_admin`. This module scopes a
//! unit of work to a user by setting those on one pooled connection, running
//! the work, and restoring the prior values afterward whether the work
//! succeeded or failed. The empty string stands for "unset" (the policies
//! treat it as NULL via `NULLIF`), so a restore of a previously-unset
//! variable clears it again.
//!
//! This is a save/restore convention, not an isolation guarantee: nothing
//! stops other code from running unscoped queries on other connections.

use futures::future::BoxFuture;
use sqlx::{PgConnection, PgPool};

use qrdeck_core::types::DbId;

/// The RLS context user variable.
pub const USER_ID_VAR: &str = "app.current_user_id";
/// The RLS context admin-flag variable.
pub const IS_ADMIN_VAR: &str = "app.is_admin";

/// Run `op` on a pooled connection scoped to `user_id`.
///
/// The admin flag widens the policies to all rows; it is set only for admin
/// console operations.
pub async fn with_user_context<T, E, F>(
    pool: &PgPool,
    user_id: DbId,
    is_admin: bool,
    op: F,
) -> Result<T, E>
where
    E: From<sqlx::Error>,
    F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, E>>,
{
    let mut conn = pool.acquire().await.map_err(E::from)?;
    with_user_context_on(&mut conn, user_id, is_admin, op).await
}

/// Like [`with_user_context`] but on an existing connection.
///
/// Saves the current values of both context variables, sets the new ones,
/// runs `op`, and restores the saved values even when `op` fails.
pub async fn with_user_context_on<T, E, F>(
    conn: &mut PgConnection,
    user_id: DbId,
    is_admin: bool,
    op: F,
) -> Result<T, E>
where
    E: From<sqlx::Error>,
    F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, E>>,
{
    let prev_user = current_value(conn, USER_ID_VAR).await.map_err(E::from)?;
    let prev_admin = current_value(conn, IS_ADMIN_VAR).await.map_err(E::from)?;

    set_value(conn, USER_ID_VAR, &user_id.to_string())
        .await
        .map_err(E::from)?;
    set_value(conn, IS_ADMIN_VAR, if is_admin { "true" } else { "false" })
        .await
        .map_err(E::from)?;

    let result = op(conn).await;

    // Restore runs regardless of the op outcome so the connection returns
    // to the pool carrying its prior context.
    let restore_user = set_value(conn, USER_ID_VAR, prev_user.as_deref().unwrap_or("")).await;
    let restore_admin = set_value(conn, IS_ADMIN_VAR, prev_admin.as_deref().unwrap_or("")).await;

    let value = result?;
    restore_user.map_err(E::from)?;
    restore_admin.map_err(E::from)?;
    Ok(value)
}

/// Read the current value of a context variable, `None` when unset or empty.
pub async fn current_value(
    conn: &mut PgConnection,
    var: &str,
) -> Result<Option<String>, sqlx::Error> {
    let value: Option<String> =
        sqlx::query_scalar("SELECT NULLIF(current_setting($1, true), '')")
            .bind(var)
            .fetch_one(conn)
            .await?;
    Ok(value)
}

async fn set_value(conn: &mut PgConnection, var: &str, value: &str) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT set_config($1, $2, false)")
        .bind(var)
        .bind(value)
        .execute(conn)
        .await?;
    Ok(())
}
