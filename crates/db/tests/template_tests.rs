//! Template repository tests, centered on the single-default invariant.

use sqlx::PgPool;

use qrdeck_db::models::template::{CreateTemplate, UpdateTemplate};
use qrdeck_db::models::user::UpsertUser;
use qrdeck_db::repositories::{TemplateRepo, UserRepo};
use qrdeck_db::rls::with_user_context;

async fn create_user(pool: &PgPool, email: &str) -> i64 {
    UserRepo::upsert(
        pool,
        &UpsertUser {
            email: email.to_string(),
            display_name: None,
            provider: "test".into(),
            provider_account_id: email.to_string(),
            is_admin: false,
        },
    )
    .await
    .expect("user upsert should succeed")
    .id
}

async fn default_count(pool: &PgPool, user_id: i64) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*)::BIGINT FROM qr_templates WHERE user_id = $1 AND is_default",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

fn template(name: &str, is_default: bool) -> CreateTemplate {
    CreateTemplate {
        name: name.to_string(),
        settings: serde_json::json!({ "dark_color": "#222222" }),
        is_default,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn creating_a_second_default_clears_the_first(pool: PgPool) {
    let user_id = create_user(&pool, "tpl@test.com").await;

    let (first, second) = with_user_context(&pool, user_id, false, |conn| {
        Box::pin(async move {
            let first = TemplateRepo::create(conn, user_id, &template("first", true)).await?;
            let second = TemplateRepo::create(conn, user_id, &template("second", true)).await?;
            Ok::<_, sqlx::Error>((first, second))
        })
    })
    .await
    .unwrap();

    assert!(second.is_default);
    assert_eq!(default_count(&pool, user_id).await, 1);

    let first_now = with_user_context(&pool, user_id, false, |conn| {
        Box::pin(async move { TemplateRepo::find_by_id(conn, first.id).await })
    })
    .await
    .unwrap()
    .expect("first template still exists");
    assert!(!first_now.is_default);
}

#[sqlx::test(migrations = "./migrations")]
async fn update_to_default_clears_previous_default(pool: PgPool) {
    let user_id = create_user(&pool, "tpl2@test.com").await;

    let (a, b) = with_user_context(&pool, user_id, false, |conn| {
        Box::pin(async move {
            let a = TemplateRepo::create(conn, user_id, &template("a", true)).await?;
            let b = TemplateRepo::create(conn, user_id, &template("b", false)).await?;
            Ok::<_, sqlx::Error>((a, b))
        })
    })
    .await
    .unwrap();

    let updated = with_user_context(&pool, user_id, false, |conn| {
        Box::pin(async move {
            TemplateRepo::update(
                conn,
                b.id,
                &UpdateTemplate {
                    is_default: Some(true),
                    ..Default::default()
                },
            )
            .await
        })
    })
    .await
    .unwrap()
    .expect("template b exists");

    assert!(updated.is_default);
    assert_eq!(default_count(&pool, user_id).await, 1);

    let a_now = with_user_context(&pool, user_id, false, |conn| {
        Box::pin(async move { TemplateRepo::find_by_id(conn, a.id).await })
    })
    .await
    .unwrap()
    .unwrap();
    assert!(!a_now.is_default);
}

#[sqlx::test(migrations = "./migrations")]
async fn defaults_are_scoped_per_user(pool: PgPool) {
    let alice = create_user(&pool, "alice@test.com").await;
    let bob = create_user(&pool, "bob@test.com").await;

    with_user_context(&pool, alice, false, |conn| {
        Box::pin(async move {
            TemplateRepo::create(conn, alice, &template("alice-default", true)).await
        })
    })
    .await
    .unwrap();

    with_user_context(&pool, bob, false, |conn| {
        Box::pin(
            async move { TemplateRepo::create(conn, bob, &template("bob-default", true)).await },
        )
    })
    .await
    .unwrap();

    // One default each; setting Bob's default must not touch Alice's.
    assert_eq!(default_count(&pool, alice).await, 1);
    assert_eq!(default_count(&pool, bob).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn list_orders_default_first(pool: PgPool) {
    let user_id = create_user(&pool, "order@test.com").await;

    let templates = with_user_context(&pool, user_id, false, |conn| {
        Box::pin(async move {
            TemplateRepo::create(conn, user_id, &template("zeta", false)).await?;
            TemplateRepo::create(conn, user_id, &template("acme", true)).await?;
            TemplateRepo::list(conn).await
        })
    })
    .await
    .unwrap();

    assert_eq!(templates.len(), 2);
    assert_eq!(templates[0].name, "acme");
    assert!(templates[0].is_default);
}

#[sqlx::test(migrations = "./migrations")]
async fn delete_removes_the_row(pool: PgPool) {
    let user_id = create_user(&pool, "del@test.com").await;

    let deleted = with_user_context(&pool, user_id, false, |conn| {
        Box::pin(async move {
            let t = TemplateRepo::create(conn, user_id, &template("gone", false)).await?;
            let deleted = TemplateRepo::delete(conn, t.id).await?;
            Ok::<_, sqlx::Error>(deleted && TemplateRepo::find_by_id(conn, t.id).await?.is_none())
        })
    })
    .await
    .unwrap();

    assert!(deleted);
}
