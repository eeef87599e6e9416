//! Handlers for saved QR codes.
//!
//! Every database access runs through [`with_user_context`] so the
//! row-level-security policies scope queries to the signed-in user; the
//! repositories themselves never filter by `user_id`.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use qrdeck_core::error::CoreError;
use qrdeck_core::qr::payload::QrKind;
use qrdeck_core::qr::{render_png, render_svg, QrStyle};
use qrdeck_core::types::DbId;
use qrdeck_db::models::{CreateQrCode, QrCode, QrCodePage, QrCodeQuery, UpdateQrCode};
use qrdeck_db::repositories::QrCodeRepo;
use qrdeck_db::rls::with_user_context;

use crate::error::{AppError, AppResult};
use crate::handlers::qr::ImageFormat;
use crate::logging;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/qr-codes
///
/// Save a new QR code for the signed-in user.
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateQrCode>,
) -> AppResult<impl IntoResponse> {
    validate_create(&input)?;

    let user_id = user.user_id;
    let created: QrCode = with_user_context(&state.pool, user_id, false, move |conn| {
        Box::pin(async move {
            QrCodeRepo::create(conn, user_id, &input)
                .await
                .map_err(AppError::from)
        })
    })
    .await?;

    logging::audit(
        &state.pool,
        user_id,
        "qr_code_create",
        format!("Created QR code {}", created.id),
        serde_json::json!({ "qr_code_id": created.id, "kind": created.kind }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /api/v1/qr-codes
///
/// List the user's QR codes with filters and pagination, newest first.
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<QrCodeQuery>,
) -> AppResult<impl IntoResponse> {
    let page: QrCodePage = with_user_context(&state.pool, user.user_id, false, move |conn| {
        Box::pin(async move {
            let items = QrCodeRepo::list(conn, &params).await?;
            let total = QrCodeRepo::count(conn, &params).await?;
            Ok::<_, AppError>(QrCodePage { items, total })
        })
    })
    .await?;

    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/qr-codes/{id}
pub async fn get(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let qr = with_user_context(&state.pool, user.user_id, false, move |conn| {
        Box::pin(async move { QrCodeRepo::find_by_id(conn, id).await.map_err(AppError::from) })
    })
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "QrCode",
        id,
    }))?;

    Ok(Json(DataResponse { data: qr }))
}

/// PUT /api/v1/qr-codes/{id}
///
/// Partial update of title, content, settings, or the favorite flag.
pub async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateQrCode>,
) -> AppResult<impl IntoResponse> {
    if let Some(content) = &input.content {
        if content.is_empty() {
            return Err(AppError::BadRequest("content must not be empty".into()));
        }
    }
    if input.settings.is_some() {
        QrStyle::from_settings(input.settings.as_ref())?;
    }

    let updated = with_user_context(&state.pool, user.user_id, false, move |conn| {
        Box::pin(async move { QrCodeRepo::update(conn, id, &input).await.map_err(AppError::from) })
    })
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "QrCode",
        id,
    }))?;

    logging::audit(
        &state.pool,
        user.user_id,
        "qr_code_update",
        format!("Updated QR code {id}"),
        serde_json::json!({ "qr_code_id": id }),
    )
    .await;

    Ok(Json(DataResponse { data: updated }))
}

/// POST /api/v1/qr-codes/{id}/favorite
///
/// Flip the favorite flag.
pub async fn toggle_favorite(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let updated = with_user_context(&state.pool, user.user_id, false, move |conn| {
        Box::pin(async move {
            QrCodeRepo::toggle_favorite(conn, id)
                .await
                .map_err(AppError::from)
        })
    })
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "QrCode",
        id,
    }))?;

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/qr-codes/{id}
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = with_user_context(&state.pool, user.user_id, false, move |conn| {
        Box::pin(async move { QrCodeRepo::delete(conn, id).await.map_err(AppError::from) })
    })
    .await?;

    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "QrCode",
            id,
        }));
    }

    logging::audit(
        &state.pool,
        user.user_id,
        "qr_code_delete",
        format!("Deleted QR code {id}"),
        serde_json::json!({ "qr_code_id": id }),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
pub struct ImageParams {
    #[serde(default)]
    pub format: ImageFormat,
}

/// GET /api/v1/qr-codes/{id}/image
///
/// Render a saved QR code with its stored settings. Returns raw image
/// bytes (`image/png` or `image/svg+xml`), not the JSON envelope.
pub async fn image(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<ImageParams>,
) -> AppResult<impl IntoResponse> {
    let qr = with_user_context(&state.pool, user.user_id, false, move |conn| {
        Box::pin(async move { QrCodeRepo::find_by_id(conn, id).await.map_err(AppError::from) })
    })
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "QrCode",
        id,
    }))?;

    let style = QrStyle::from_settings(qr.settings.as_ref())?;

    logging::qr_generation(
        &state.pool,
        user.user_id,
        format!("Rendered saved QR code {id}"),
    )
    .await;

    match params.format {
        ImageFormat::Png => {
            let png = render_png(&qr.content, &style)?;
            Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
        }
        ImageFormat::Svg => {
            let svg = render_svg(&qr.content, &style)?;
            Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
        }
    }
}

fn validate_create(input: &CreateQrCode) -> Result<(), AppError> {
    input
        .kind
        .parse::<QrKind>()
        .map_err(AppError::BadRequest)?;
    if input.content.is_empty() {
        return Err(AppError::BadRequest("content must not be empty".into()));
    }
    QrStyle::from_settings(input.settings.as_ref())?;
    Ok(())
}
