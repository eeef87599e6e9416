//! Periodic retention sweep over the application log table.
//!
//! Spawns a background task that removes `app_logs` rows older than the
//! configured retention period using the batched cleanup engine. Runs on
//! a fixed interval using `tokio::time::interval`.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use qrdeck_db::DbPool;

use crate::logging::cleanup::cleanup_old_logs;

/// How often the sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 3600); // daily

/// Run the log retention loop.
///
/// Sweeps log rows older than `retention_days`. Runs until `cancel` is
/// triggered; the first tick fires immediately at startup.
pub async fn run(pool: DbPool, retention_days: i64, cancel: CancellationToken) {
    tracing::info!(
        retention_days,
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Log retention job started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Log retention job stopping");
                break;
            }
            _ = interval.tick() => {
                match cleanup_old_logs(&pool, retention_days).await {
                    Ok(report) => {
                        if report.deleted > 0 {
                            tracing::info!(deleted = report.deleted, "Log retention: purged old rows");
                        } else {
                            tracing::debug!("Log retention: no rows to purge");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Log retention: sweep failed");
                    }
                }
            }
        }
    }
}
