//! QR code repository tests: CRUD, filters, and pagination.

use sqlx::PgPool;

use qrdeck_db::models::qr_code::{CreateQrCode, QrCodeQuery, UpdateQrCode};
use qrdeck_db::models::user::UpsertUser;
use qrdeck_db::repositories::{QrCodeRepo, UserRepo};
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

fn qr(kind: &str, title: &str, content: &str) -> CreateQrCode {
    CreateQrCode {
        kind: kind.to_string(),
        title: Some(title.to_string()),
        content: content.to_string(),
        settings: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn create_and_fetch_round_trip(pool: PgPool) {
    let user_id = create_user(&pool, "qr@test.com").await;

    let fetched = with_user_context(&pool, user_id, false, |conn| {
        Box::pin(async move {
            let created =
                QrCodeRepo::create(conn, user_id, &qr("url", "Home", "https://example.com"))
                    .await?;
            QrCodeRepo::find_by_id(conn, created.id).await
        })
    })
    .await
    .unwrap()
    .expect("created row is visible");

    assert_eq!(fetched.user_id, user_id);
    assert_eq!(fetched.kind, "url");
    assert_eq!(fetched.content, "https://example.com");
    assert!(!fetched.is_favorite);
}

#[sqlx::test(migrations = "./migrations")]
async fn list_filters_by_kind_favorite_and_search(pool: PgPool) {
    let user_id = create_user(&pool, "filter@test.com").await;

    with_user_context(&pool, user_id, false, |conn| {
        Box::pin(async move {
            QrCodeRepo::create(conn, user_id, &qr("url", "Company site", "https://acme.test"))
                .await?;
            QrCodeRepo::create(conn, user_id, &qr("wifi", "Office WiFi", "WIFI:T:WPA;S:hq;;"))
                .await?;
            let sms = QrCodeRepo::create(conn, user_id, &qr("sms", "Support", "SMSTO:+1:hi"))
                .await?;
            QrCodeRepo::toggle_favorite(conn, sms.id).await?;
            Ok::<_, sqlx::Error>(())
        })
    })
    .await
    .unwrap();

    let (by_kind, favorites, by_search, total) =
        with_user_context(&pool, user_id, false, |conn| {
            Box::pin(async move {
                let by_kind = QrCodeRepo::list(
                    conn,
                    &QrCodeQuery {
                        kind: Some("wifi".into()),
                        ..Default::default()
                    },
                )
                .await?;
                let favorites = QrCodeRepo::list(
                    conn,
                    &QrCodeQuery {
                        favorite: Some(true),
                        ..Default::default()
                    },
                )
                .await?;
                let by_search = QrCodeRepo::list(
                    conn,
                    &QrCodeQuery {
                        search: Some("acme".into()),
                        ..Default::default()
                    },
                )
                .await?;
                let total = QrCodeRepo::count(conn, &QrCodeQuery::default()).await?;
                Ok::<_, sqlx::Error>((by_kind, favorites, by_search, total))
            })
        })
        .await
        .unwrap();

    assert_eq!(by_kind.len(), 1);
    assert_eq!(by_kind[0].title.as_deref(), Some("Office WiFi"));
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].kind, "sms");
    assert_eq!(by_search.len(), 1);
    assert_eq!(by_search[0].content, "https://acme.test");
    assert_eq!(total, 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn partial_update_touches_only_given_fields(pool: PgPool) {
    let user_id = create_user(&pool, "upd@test.com").await;

    let updated = with_user_context(&pool, user_id, false, |conn| {
        Box::pin(async move {
            let created =
                QrCodeRepo::create(conn, user_id, &qr("text", "Note", "original")).await?;
            QrCodeRepo::update(
                conn,
                created.id,
                &UpdateQrCode {
                    content: Some("revised".into()),
                    ..Default::default()
                },
            )
            .await
        })
    })
    .await
    .unwrap()
    .expect("row exists");

    assert_eq!(updated.content, "revised");
    assert_eq!(updated.title.as_deref(), Some("Note"));
    assert!(updated.updated_at >= updated.created_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn toggle_favorite_flips_the_flag(pool: PgPool) {
    let user_id = create_user(&pool, "fav@test.com").await;

    let (on, off) = with_user_context(&pool, user_id, false, |conn| {
        Box::pin(async move {
            let created = QrCodeRepo::create(conn, user_id, &qr("url", "t", "https://x.test"))
                .await?;
            let on = QrCodeRepo::toggle_favorite(conn, created.id).await?.unwrap();
            let off = QrCodeRepo::toggle_favorite(conn, created.id).await?.unwrap();
            Ok::<_, sqlx::Error>((on, off))
        })
    })
    .await
    .unwrap();

    assert!(on.is_favorite);
    assert!(!off.is_favorite);
}

#[sqlx::test(migrations = "./migrations")]
async fn delete_then_fetch_returns_none(pool: PgPool) {
    let user_id = create_user(&pool, "gone@test.com").await;

    let fetched = with_user_context(&pool, user_id, false, |conn| {
        Box::pin(async move {
            let created = QrCodeRepo::create(conn, user_id, &qr("url", "t", "https://x.test"))
                .await?;
            assert!(QrCodeRepo::delete(conn, created.id).await?);
            QrCodeRepo::find_by_id(conn, created.id).await
        })
    })
    .await
    .unwrap();

    assert!(fetched.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn pagination_returns_newest_first(pool: PgPool) {
    let user_id = create_user(&pool, "page@test.com").await;

    let page = with_user_context(&pool, user_id, false, |conn| {
        Box::pin(async move {
            for i in 0..5 {
                QrCodeRepo::create(conn, user_id, &qr("text", &format!("n{i}"), "body")).await?;
            }
            QrCodeRepo::list(
                conn,
                &QrCodeQuery {
                    limit: Some(2),
                    offset: Some(0),
                    ..Default::default()
                },
            )
            .await
        })
    })
    .await
    .unwrap();

    assert_eq!(page.len(), 2);
    // BIGSERIAL ids increase with insertion order; newest first.
    assert!(page[0].id > page[1].id);
}

#[sqlx::test(migrations = "./migrations")]
async fn negative_limit_and_offset_are_clamped(pool: PgPool) {
    let user_id = create_user(&pool, "clamp@test.com").await;

    let (empty, all) = with_user_context(&pool, user_id, false, |conn| {
        Box::pin(async move {
            QrCodeRepo::create(conn, user_id, &qr("url", "t", "https://x.test")).await?;
            let empty = QrCodeRepo::list(
                conn,
                &QrCodeQuery {
                    limit: Some(-5),
                    ..Default::default()
                },
            )
            .await?;
            let all = QrCodeRepo::list(
                conn,
                &QrCodeQuery {
                    offset: Some(-10),
                    ..Default::default()
                },
            )
            .await?;
            Ok::<_, sqlx::Error>((empty, all))
        })
    })
    .await
    .unwrap();

    assert!(empty.is_empty());
    assert_eq!(all.len(), 1);
}
