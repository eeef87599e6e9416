//! App log repository tests: append, filtered queries, stats, and the
//! retention primitives the cleanup engine builds on.

use chrono::{Duration, Utc};
use sqlx::PgPool;

use qrdeck_core::log::{LogLevel, LogType};
use qrdeck_db::models::app_log::{LogQuery, NewAppLog};
use qrdeck_db::repositories::AppLogRepo;

/// Backdate a log row; the insert path always stamps `now()`.
async fn backdate(pool: &PgPool, id: i64, days: i64) {
    sqlx::query("UPDATE app_logs SET created_at = now() - make_interval(days => $2::int) WHERE id = $1")
        .bind(id)
        .bind(days)
        .execute(pool)
        .await
        .unwrap();
}

#[sqlx::test(migrations = "./migrations")]
async fn insert_returns_created_row(pool: PgPool) {
    let entry = NewAppLog::new(LogType::System, "startup", "service started")
        .metadata(serde_json::json!({ "version": "0.1.0" }));
    let row = AppLogRepo::insert(&pool, &entry).await.unwrap();

    assert_eq!(row.log_type, "system");
    assert_eq!(row.action, "startup");
    assert_eq!(row.level, "info");
    assert_eq!(row.metadata.unwrap()["version"], "0.1.0");
}

#[sqlx::test(migrations = "./migrations")]
async fn query_filters_by_type_level_and_search(pool: PgPool) {
    AppLogRepo::insert(&pool, &NewAppLog::new(LogType::Auth, "sign_in", "user signed in"))
        .await
        .unwrap();
    AppLogRepo::insert(
        &pool,
        &NewAppLog::new(LogType::Error, "render", "render failed").level(LogLevel::Error),
    )
    .await
    .unwrap();
    AppLogRepo::insert(&pool, &NewAppLog::new(LogType::Auth, "sign_out", "user signed out"))
        .await
        .unwrap();

    let auth_only = AppLogRepo::query(
        &pool,
        &LogQuery {
            log_type: Some(LogType::Auth),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(auth_only.len(), 2);
    assert!(auth_only.iter().all(|l| l.log_type == "auth"));

    let errors = AppLogRepo::query(
        &pool,
        &LogQuery {
            level: Some(LogLevel::Error),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].action, "render");

    let searched = AppLogRepo::count(
        &pool,
        &LogQuery {
            search: Some("signed out".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(searched, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn query_orders_newest_first(pool: PgPool) {
    let a = AppLogRepo::insert(&pool, &NewAppLog::new(LogType::System, "a", "first"))
        .await
        .unwrap();
    backdate(&pool, a.id, 2).await;
    AppLogRepo::insert(&pool, &NewAppLog::new(LogType::System, "b", "second"))
        .await
        .unwrap();

    let logs = AppLogRepo::query(&pool, &LogQuery::default()).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].action, "b");
    assert_eq!(logs[1].action, "a");
}

#[sqlx::test(migrations = "./migrations")]
async fn stats_bucket_by_type_and_level(pool: PgPool) {
    for _ in 0..3 {
        AppLogRepo::insert(&pool, &NewAppLog::new(LogType::Access, "request", "GET /"))
            .await
            .unwrap();
    }
    AppLogRepo::insert(
        &pool,
        &NewAppLog::new(LogType::Error, "request", "boom").level(LogLevel::Fatal),
    )
    .await
    .unwrap();

    let stats = AppLogRepo::stats(&pool).await.unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(
        stats
            .by_type
            .iter()
            .find(|b| b.key == "access")
            .map(|b| b.count),
        Some(3)
    );
    assert_eq!(
        stats
            .by_level
            .iter()
            .find(|b| b.key == "fatal")
            .map(|b| b.count),
        Some(1)
    );
    assert!(stats.oldest.is_some());
    assert!(stats.newest.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn retention_primitives_respect_cutoff_and_filters(pool: PgPool) {
    let old_access = AppLogRepo::insert(&pool, &NewAppLog::new(LogType::Access, "request", "old"))
        .await
        .unwrap();
    backdate(&pool, old_access.id, 100).await;
    let old_auth = AppLogRepo::insert(&pool, &NewAppLog::new(LogType::Auth, "sign_in", "old"))
        .await
        .unwrap();
    backdate(&pool, old_auth.id, 100).await;
    AppLogRepo::insert(&pool, &NewAppLog::new(LogType::Access, "request", "fresh"))
        .await
        .unwrap();

    let cutoff = Utc::now() - Duration::days(90);

    let all_old = AppLogRepo::count_older_than(&pool, cutoff, &[], &[])
        .await
        .unwrap();
    assert_eq!(all_old, 2);

    let only_access = AppLogRepo::count_older_than(&pool, cutoff, &[LogType::Access], &[])
        .await
        .unwrap();
    assert_eq!(only_access, 1);

    let ids = AppLogRepo::ids_older_than(&pool, cutoff, &[], &[], 1000)
        .await
        .unwrap();
    assert_eq!(ids.len(), 2);

    let deleted = AppLogRepo::delete_by_ids(&pool, &ids).await.unwrap();
    assert_eq!(deleted, 2);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM app_logs")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn delete_by_ids_with_empty_set_is_a_no_op(pool: PgPool) {
    let deleted = AppLogRepo::delete_by_ids(&pool, &[]).await.unwrap();
    assert_eq!(deleted, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn negative_limit_and_offset_are_clamped(pool: PgPool) {
    AppLogRepo::insert(&pool, &NewAppLog::new(LogType::System, "a", "only row"))
        .await
        .unwrap();

    let empty = AppLogRepo::query(
        &pool,
        &LogQuery {
            limit: Some(-1),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(empty.is_empty());

    let all = AppLogRepo::query(
        &pool,
        &LogQuery {
            offset: Some(-20),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(all.len(), 1);
}
