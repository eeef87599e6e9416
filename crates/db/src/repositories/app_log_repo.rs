//! Repository for the append-only `app_logs` table.
//!
//! Provides the insert path used by the unified logger, filtered queries for
//! the admin console, and the primitives the retention-cleanup engine is
//! built from (count / fetch-ids / delete-by-ids).

use sqlx::postgres::Postgres;
use sqlx::PgPool;

use qrdeck_core::log::{LogLevel, LogType};
use qrdeck_core::types::{DbId, Timestamp};

use crate::models::app_log::{AppLog, LogBucket, LogQuery, LogStats, NewAppLog};

const COLUMNS: &str = "id, user_id, log_type, action, category, message, \
     metadata, level, ip_address, user_agent, created_at";

/// Provides append, query, and deletion primitives for application logs.
pub struct AppLogRepo;

impl AppLogRepo {
    /// Append a log entry, returning the created row.
    pub async fn insert(pool: &PgPool, entry: &NewAppLog) -> Result<AppLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO app_logs \
                (user_id, log_type, action, category, message, metadata, \
                 level, ip_address, user_agent) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AppLog>(&query)
            .bind(entry.user_id)
            .bind(entry.log_type.as_str())
            .bind(&entry.action)
            .bind(&entry.category)
            .bind(&entry.message)
            .bind(&entry.metadata)
            .bind(entry.level.as_str())
            .bind(&entry.ip_address)
            .bind(&entry.user_agent)
            .fetch_one(pool)
            .await
    }

    /// Query logs with filtering and pagination, newest first.
    pub async fn query(pool: &PgPool, params: &LogQuery) -> Result<Vec<AppLog>, sqlx::Error> {
        let limit = params.limit.unwrap_or(50).clamp(0, 500);
        let offset = params.offset.unwrap_or(0).max(0);

        let (where_clause, next_idx) = filter_clause(params);
        let query = format!(
            "SELECT {COLUMNS} FROM app_logs {where_clause} \
             ORDER BY created_at DESC, id DESC \
             LIMIT ${next_idx} OFFSET ${}",
            next_idx + 1
        );

        let q = bind_filters(sqlx::query_as::<_, AppLog>(&query), params);
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Count logs matching the filter (for pagination metadata).
    pub async fn count(pool: &PgPool, params: &LogQuery) -> Result<i64, sqlx::Error> {
        let (where_clause, _) = filter_clause(params);
        let query = format!("SELECT COUNT(*)::BIGINT FROM app_logs {where_clause}");

        let q = bind_filters_scalar(sqlx::query_scalar::<_, i64>(&query), params);
        q.fetch_one(pool).await
    }

    /// Aggregate statistics: total, per-type and per-level counts, and the
    /// time range covered by the table.
    pub async fn stats(pool: &PgPool) -> Result<LogStats, sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM app_logs")
            .fetch_one(pool)
            .await?;

        let by_type = sqlx::query_as::<_, LogBucket>(
            "SELECT log_type AS key, COUNT(*)::BIGINT AS count \
             FROM app_logs GROUP BY log_type ORDER BY count DESC",
        )
        .fetch_all(pool)
        .await?;

        let by_level = sqlx::query_as::<_, LogBucket>(
            "SELECT level AS key, COUNT(*)::BIGINT AS count \
             FROM app_logs GROUP BY level ORDER BY count DESC",
        )
        .fetch_all(pool)
        .await?;

        let (oldest, newest): (Option<Timestamp>, Option<Timestamp>) =
            sqlx::query_as("SELECT MIN(created_at), MAX(created_at) FROM app_logs")
                .fetch_one(pool)
                .await?;

        Ok(LogStats {
            total,
            by_type,
            by_level,
            oldest,
            newest,
        })
    }

    /// Count rows older than `cutoff`, optionally restricted by type/level.
    pub async fn count_older_than(
        pool: &PgPool,
        cutoff: Timestamp,
        types: &[LogType],
        levels: &[LogLevel],
    ) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*)::BIGINT FROM app_logs WHERE created_at < $1{}",
            retention_filters(types, levels)
        );
        bind_retention(sqlx::query_scalar::<_, i64>(&query).bind(cutoff), types, levels)
            .fetch_one(pool)
            .await
    }

    /// Fetch up to `limit` ids of rows older than `cutoff`, oldest first.
    pub async fn ids_older_than(
        pool: &PgPool,
        cutoff: Timestamp,
        types: &[LogType],
        levels: &[LogLevel],
        limit: i64,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let query = format!(
            "SELECT id FROM app_logs WHERE created_at < $1{} \
             ORDER BY created_at ASC, id ASC LIMIT {limit}",
            retention_filters(types, levels)
        );
        bind_retention(sqlx::query_scalar::<_, DbId>(&query).bind(cutoff), types, levels)
            .fetch_all(pool)
            .await
    }

    /// Delete rows by ID set, returning the number of rows removed.
    pub async fn delete_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM app_logs WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

// ---------------------------------------------------------------------------
// Filter building
// ---------------------------------------------------------------------------

/// Build the WHERE clause for a [`LogQuery`].
///
/// Conditions appear in a fixed order; the bind helpers below must bind in
/// the same order. Returns the clause and the next free parameter index.
fn filter_clause(params: &LogQuery) -> (String, u32) {
    let mut conditions = Vec::new();
    let mut idx = 1u32;

    if params.log_type.is_some() {
        conditions.push(format!("log_type = ${idx}"));
        idx += 1;
    }
    if params.level.is_some() {
        conditions.push(format!("level = ${idx}"));
        idx += 1;
    }
    if params.user_id.is_some() {
        conditions.push(format!("user_id = ${idx}"));
        idx += 1;
    }
    if params.from.is_some() {
        conditions.push(format!("created_at >= ${idx}"));
        idx += 1;
    }
    if params.to.is_some() {
        conditions.push(format!("created_at <= ${idx}"));
        idx += 1;
    }
    if params.search.is_some() {
        conditions.push(format!("(action ILIKE ${idx} OR message ILIKE ${idx})"));
        idx += 1;
    }

    let clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    (clause, idx)
}

type LogQueryAs<'q> =
    sqlx::query::QueryAs<'q, Postgres, AppLog, sqlx::postgres::PgArguments>;

fn bind_filters<'q>(mut q: LogQueryAs<'q>, params: &'q LogQuery) -> LogQueryAs<'q> {
    if let Some(t) = params.log_type {
        q = q.bind(t.as_str());
    }
    if let Some(l) = params.level {
        q = q.bind(l.as_str());
    }
    if let Some(u) = params.user_id {
        q = q.bind(u);
    }
    if let Some(from) = params.from {
        q = q.bind(from);
    }
    if let Some(to) = params.to {
        q = q.bind(to);
    }
    if let Some(s) = &params.search {
        q = q.bind(format!("%{s}%"));
    }
    q
}

type LogScalar<'q> = sqlx::query::QueryScalar<'q, Postgres, i64, sqlx::postgres::PgArguments>;

fn bind_filters_scalar<'q>(mut q: LogScalar<'q>, params: &'q LogQuery) -> LogScalar<'q> {
    if let Some(t) = params.log_type {
        q = q.bind(t.as_str());
    }
    if let Some(l) = params.level {
        q = q.bind(l.as_str());
    }
    if let Some(u) = params.user_id {
        q = q.bind(u);
    }
    if let Some(from) = params.from {
        q = q.bind(from);
    }
    if let Some(to) = params.to {
        q = q.bind(to);
    }
    if let Some(s) = &params.search {
        q = q.bind(format!("%{s}%"));
    }
    q
}

/// Extra conditions for the retention primitives ($1 is always the cutoff).
fn retention_filters(types: &[LogType], levels: &[LogLevel]) -> String {
    let mut clause = String::new();
    let mut idx = 2u32;
    if !types.is_empty() {
        clause.push_str(&format!(" AND log_type = ANY(${idx})"));
        idx += 1;
    }
    if !levels.is_empty() {
        clause.push_str(&format!(" AND level = ANY(${idx})"));
    }
    clause
}

fn bind_retention<'q, O>(
    mut q: sqlx::query::QueryScalar<'q, Postgres, O, sqlx::postgres::PgArguments>,
    types: &[LogType],
    levels: &[LogLevel],
) -> sqlx::query::QueryScalar<'q, Postgres, O, sqlx::postgres::PgArguments> {
    if !types.is_empty() {
        let names: Vec<String> = types.iter().map(|t| t.as_str().to_string()).collect();
        q = q.bind(names);
    }
    if !levels.is_empty() {
        let names: Vec<String> = levels.iter().map(|l| l.as_str().to_string()).collect();
        q = q.bind(names);
    }
    q
}
