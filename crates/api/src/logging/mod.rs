//! Unified application logging.
//!
//! Every notable event lands in the `app_logs` table: HTTP access, auth
//! flow transitions, data mutations (audit), QR generation, admin actions,
//! errors, and system maintenance. Writes are best-effort: a failed insert
//! is reported via `tracing` and never propagated, so logging can never
//! take down the request that triggered it.

pub mod cleanup;

use qrdeck_core::log::{LogLevel, LogType};
use qrdeck_core::types::DbId;
use qrdeck_db::models::NewAppLog;
use qrdeck_db::repositories::AppLogRepo;
use qrdeck_db::DbPool;

/// Append a log entry, swallowing any database error.
pub async fn write(pool: &DbPool, entry: NewAppLog) {
    if let Err(err) = AppLogRepo::insert(pool, &entry).await {
        tracing::error!(
            error = %err,
            log_type = entry.log_type.as_str(),
            action = %entry.action,
            "failed to write application log entry"
        );
    }
}

/// Log a sign-in, sign-out, or token refresh event.
pub async fn auth_event(pool: &DbPool, user_id: DbId, action: &str, message: impl Into<String>) {
    write(pool, NewAppLog::new(LogType::Auth, action, message).user(user_id)).await;
}

/// Log a data mutation performed by a user.
pub async fn audit(
    pool: &DbPool,
    user_id: DbId,
    action: &str,
    message: impl Into<String>,
    metadata: serde_json::Value,
) {
    write(
        pool,
        NewAppLog::new(LogType::Audit, action, message)
            .user(user_id)
            .metadata(metadata),
    )
    .await;
}

/// Log a QR image render.
pub async fn qr_generation(pool: &DbPool, user_id: DbId, message: impl Into<String>) {
    write(
        pool,
        NewAppLog::new(LogType::QrGeneration, "generate", message).user(user_id),
    )
    .await;
}

/// Log an administrative action.
pub async fn admin_action(
    pool: &DbPool,
    admin_user_id: DbId,
    action: &str,
    message: impl Into<String>,
    metadata: serde_json::Value,
) {
    write(
        pool,
        NewAppLog::new(LogType::Admin, action, message)
            .user(admin_user_id)
            .metadata(metadata),
    )
    .await;
}

/// Log an application error with ERROR level.
pub async fn error_event(pool: &DbPool, action: &str, message: impl Into<String>) {
    write(
        pool,
        NewAppLog::new(LogType::Error, action, message).level(LogLevel::Error),
    )
    .await;
}
