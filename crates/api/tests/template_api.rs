//! HTTP-level integration tests for styling templates, in particular the
//! one-default-per-user invariant.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, create_user, fresh_tokens, get, post_json, put_json, session_token,
};
use sqlx::PgPool;

async fn create_template(
    app: axum::Router,
    token: &str,
    name: &str,
    is_default: bool,
) -> serde_json::Value {
    let response = post_json(
        app,
        "/api/v1/templates",
        Some(token),
        serde_json::json!({
            "name": name,
            "settings": { "size": 512 },
            "is_default": is_default,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[sqlx::test(migrations = "../db/migrations")]
async fn creating_second_default_demotes_first(pool: PgPool) {
    let user = create_user(&pool, "alice@test.com", false).await;
    let token = session_token(&user, fresh_tokens(false));

    let first = create_template(build_test_app(pool.clone()), &token, "first", true).await;
    let second = create_template(build_test_app(pool.clone()), &token, "second", true).await;

    let response = get(build_test_app(pool), "/api/v1/templates/default", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], second["data"]["id"]);
    assert_ne!(json["data"]["id"], first["data"]["id"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_to_default_demotes_previous(pool: PgPool) {
    let user = create_user(&pool, "alice@test.com", false).await;
    let token = session_token(&user, fresh_tokens(false));

    create_template(build_test_app(pool.clone()), &token, "old-default", true).await;
    let plain = create_template(build_test_app(pool.clone()), &token, "plain", false).await;
    let plain_id = plain["data"]["id"].as_i64().unwrap();

    let response = put_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/templates/{plain_id}"),
        Some(&token),
        serde_json::json!({ "is_default": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let defaults: i64 = sqlx::query_scalar(
        "SELECT COUNT(*)::BIGINT FROM qr_templates WHERE user_id = $1 AND is_default",
    )
    .bind(user.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(defaults, 1);

    let response = get(build_test_app(pool), "/api/v1/templates/default", Some(&token)).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], plain_id);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn default_endpoint_404_when_none_set(pool: PgPool) {
    let user = create_user(&pool, "alice@test.com", false).await;
    let token = session_token(&user, fresh_tokens(false));

    create_template(build_test_app(pool.clone()), &token, "plain", false).await;

    let response = get(build_test_app(pool), "/api/v1/templates/default", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_rejects_invalid_settings(pool: PgPool) {
    let user = create_user(&pool, "alice@test.com", false).await;
    let token = session_token(&user, fresh_tokens(false));
    let app = build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/templates",
        Some(&token),
        serde_json::json!({ "name": "bad", "settings": { "dark_color": "red" } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn list_orders_default_first(pool: PgPool) {
    let user = create_user(&pool, "alice@test.com", false).await;
    let token = session_token(&user, fresh_tokens(false));

    create_template(build_test_app(pool.clone()), &token, "aaa", false).await;
    create_template(build_test_app(pool.clone()), &token, "zzz", true).await;

    let response = get(build_test_app(pool), "/api/v1/templates", Some(&token)).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["name"], "zzz");
    assert_eq!(json["data"][0]["is_default"], true);
    assert_eq!(json["data"][1]["name"], "aaa");
}
