//! Batched retention cleanup for the application log table.
//!
//! Deleting millions of rows in one statement holds locks for too long, so
//! cleanup works in id batches: count the matching rows, then repeatedly
//! fetch up to [`BATCH_SIZE`] ids and delete exactly those, pausing between
//! batches to let other transactions through.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use qrdeck_core::log::{LogLevel, LogType};
use qrdeck_core::types::{DbId, Timestamp};
use qrdeck_db::models::NewAppLog;
use qrdeck_db::repositories::AppLogRepo;
use qrdeck_db::DbPool;

use crate::logging;

/// Maximum rows deleted per batch.
pub const BATCH_SIZE: i64 = 1000;
/// Pause between consecutive delete batches.
pub const BATCH_PAUSE: Duration = Duration::from_millis(100);

/// Parameters for a manually triggered cleanup.
#[derive(Debug, Clone, Deserialize)]
pub struct CleanupParams {
    /// Delete rows created strictly before this instant.
    pub cutoff: Timestamp,
    /// Restrict to these log types; empty means all types.
    #[serde(default)]
    pub types: Vec<LogType>,
    /// Restrict to these levels; empty means all levels.
    #[serde(default)]
    pub levels: Vec<LogLevel>,
    /// When set, only count what would be deleted.
    #[serde(default)]
    pub dry_run: bool,
}

/// Outcome of a cleanup run.
#[derive(Debug, Clone, Serialize)]
pub struct CleanupReport {
    /// Rows matching the criteria when the run started.
    pub matched: i64,
    /// Rows actually deleted (always 0 for a dry run).
    pub deleted: u64,
    /// Delete batches executed.
    pub batches: u32,
    pub dry_run: bool,
}

/// Scheduled cleanup: sweep rows older than `retention_days`.
///
/// Writes a SYSTEM log entry describing the sweep unless nothing was
/// deleted. A non-positive retention disables the sweep entirely.
pub async fn cleanup_old_logs(pool: &DbPool, retention_days: i64) -> Result<CleanupReport, sqlx::Error> {
    if retention_days <= 0 {
        tracing::debug!("log retention disabled, skipping sweep");
        return Ok(CleanupReport {
            matched: 0,
            deleted: 0,
            batches: 0,
            dry_run: false,
        });
    }

    let cutoff = Utc::now() - chrono::Duration::days(retention_days);
    let report = delete_in_batches(pool, cutoff, &[], &[]).await?;

    if report.deleted > 0 {
        tracing::info!(
            deleted = report.deleted,
            batches = report.batches,
            retention_days,
            "log retention sweep complete"
        );
        logging::write(
            pool,
            NewAppLog::new(
                LogType::System,
                "log_cleanup",
                format!(
                    "Retention sweep removed {} log entries older than {} days",
                    report.deleted, retention_days
                ),
            )
            .metadata(serde_json::json!({
                "deleted": report.deleted,
                "batches": report.batches,
                "cutoff": cutoff,
                "retention_days": retention_days,
            })),
        )
        .await;
    }

    Ok(report)
}

/// Admin-triggered cleanup with explicit criteria.
///
/// A dry run only counts; otherwise the deletion is recorded as an ADMIN
/// log entry attributed to `admin_user_id` when anything was removed.
pub async fn manual_cleanup(
    pool: &DbPool,
    params: &CleanupParams,
    admin_user_id: DbId,
) -> Result<CleanupReport, sqlx::Error> {
    if params.dry_run {
        let matched =
            AppLogRepo::count_older_than(pool, params.cutoff, &params.types, &params.levels)
                .await?;
        return Ok(CleanupReport {
            matched,
            deleted: 0,
            batches: 0,
            dry_run: true,
        });
    }

    let report = delete_in_batches(pool, params.cutoff, &params.types, &params.levels).await?;

    if report.deleted > 0 {
        logging::write(
            pool,
            NewAppLog::new(
                LogType::Admin,
                "log_cleanup",
                format!("Manually removed {} log entries", report.deleted),
            )
            .user(admin_user_id)
            .metadata(serde_json::json!({
                "deleted": report.deleted,
                "batches": report.batches,
                "cutoff": params.cutoff,
                "types": params.types,
                "levels": params.levels,
            })),
        )
        .await;
    }

    Ok(report)
}

/// Core batch loop shared by scheduled and manual cleanup.
///
/// When no rows match, no delete statement is issued at all.
async fn delete_in_batches(
    pool: &DbPool,
    cutoff: Timestamp,
    types: &[LogType],
    levels: &[LogLevel],
) -> Result<CleanupReport, sqlx::Error> {
    let matched = AppLogRepo::count_older_than(pool, cutoff, types, levels).await?;
    let mut deleted: u64 = 0;
    let mut batches: u32 = 0;

    if matched > 0 {
        loop {
            let ids = AppLogRepo::ids_older_than(pool, cutoff, types, levels, BATCH_SIZE).await?;
            if ids.is_empty() {
                break;
            }
            deleted += AppLogRepo::delete_by_ids(pool, &ids).await?;
            batches += 1;
            tracing::debug!(batch = batches, deleted, "log cleanup batch complete");

            if (ids.len() as i64) < BATCH_SIZE {
                break;
            }
            tokio::time::sleep(BATCH_PAUSE).await;
        }
    }

    Ok(CleanupReport {
        matched,
        deleted,
        batches,
        dry_run: false,
    })
}
