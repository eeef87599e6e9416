//! Admin log console: query, statistics, export, and manual cleanup.
//!
//! Every endpoint requires the admin flag via [`RequireAdmin`]. Logs are
//! append-only; the only deletion path is the batched cleanup engine.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;

use qrdeck_db::models::{LogPage, LogQuery};
use qrdeck_db::repositories::AppLogRepo;

use crate::error::AppResult;
use crate::logging;
use crate::logging::cleanup::{manual_cleanup, CleanupParams};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/logs
///
/// Query log entries with filters and pagination, newest first.
pub async fn list_logs(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<LogQuery>,
) -> AppResult<impl IntoResponse> {
    let items = AppLogRepo::query(&state.pool, &params).await?;
    let total = AppLogRepo::count(&state.pool, &params).await?;

    Ok(Json(DataResponse {
        data: LogPage { items, total },
    }))
}

/// GET /api/v1/admin/logs/stats
///
/// Aggregate counts by type and level plus the covered time range.
pub async fn log_stats(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let stats = AppLogRepo::stats(&state.pool).await?;

    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/admin/logs/export
///
/// Export log entries matching the filters as a JSON array. Uses the same
/// filter vocabulary as the list endpoint but a higher row cap.
pub async fn export_logs(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Query(mut params): Query<LogQuery>,
) -> AppResult<impl IntoResponse> {
    params.limit = Some(params.limit.unwrap_or(500).min(500));
    let items = AppLogRepo::query(&state.pool, &params).await?;

    logging::admin_action(
        &state.pool,
        admin.user_id,
        "log_export",
        format!("Exported {} log entries", items.len()),
        serde_json::json!({ "count": items.len() }),
    )
    .await;

    Ok(Json(DataResponse { data: items }))
}

/// POST /api/v1/admin/logs/cleanup
///
/// Trigger a batched cleanup with explicit criteria. With `dry_run` the
/// response reports what would be deleted and nothing is removed.
pub async fn cleanup_logs(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(params): Json<CleanupParams>,
) -> AppResult<impl IntoResponse> {
    let report = manual_cleanup(&state.pool, &params, admin.user_id).await?;

    tracing::info!(
        admin_user_id = admin.user_id,
        matched = report.matched,
        deleted = report.deleted,
        dry_run = report.dry_run,
        "Manual log cleanup"
    );

    Ok(Json(DataResponse { data: report }))
}
