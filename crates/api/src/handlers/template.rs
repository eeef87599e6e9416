//! Handlers for styling templates.
//!
//! Template settings must parse as a valid style document; the one-default-
//! per-user invariant is enforced inside [`TemplateRepo`] transactions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use qrdeck_core::error::CoreError;
use qrdeck_core::qr::QrStyle;
use qrdeck_core::types::DbId;
use qrdeck_db::models::{CreateTemplate, UpdateTemplate};
use qrdeck_db::repositories::TemplateRepo;
use qrdeck_db::rls::with_user_context;

use crate::error::{AppError, AppResult};
use crate::logging;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/templates
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTemplate>,
) -> AppResult<impl IntoResponse> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }
    QrStyle::from_settings(Some(&input.settings))?;

    let user_id = user.user_id;
    let created = with_user_context(&state.pool, user_id, false, move |conn| {
        Box::pin(async move {
            TemplateRepo::create(conn, user_id, &input)
                .await
                .map_err(AppError::from)
        })
    })
    .await?;

    logging::audit(
        &state.pool,
        user_id,
        "template_create",
        format!("Created template {} ({})", created.id, created.name),
        serde_json::json!({ "template_id": created.id, "is_default": created.is_default }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /api/v1/templates
///
/// List the user's templates, default first.
pub async fn list(user: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let templates = with_user_context(&state.pool, user.user_id, false, move |conn| {
        Box::pin(async move { TemplateRepo::list(conn).await.map_err(AppError::from) })
    })
    .await?;

    Ok(Json(DataResponse { data: templates }))
}

/// GET /api/v1/templates/default
///
/// The user's default template, or 404 when none is set.
pub async fn get_default(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let template = with_user_context(&state.pool, user.user_id, false, move |conn| {
        Box::pin(async move { TemplateRepo::find_default(conn).await.map_err(AppError::from) })
    })
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "QrTemplate",
        id: 0,
    }))?;

    Ok(Json(DataResponse { data: template }))
}

/// GET /api/v1/templates/{id}
pub async fn get(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let template = with_user_context(&state.pool, user.user_id, false, move |conn| {
        Box::pin(async move { TemplateRepo::find_by_id(conn, id).await.map_err(AppError::from) })
    })
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "QrTemplate",
        id,
    }))?;

    Ok(Json(DataResponse { data: template }))
}

/// PUT /api/v1/templates/{id}
///
/// Partial update. Setting `is_default = true` demotes the previous
/// default in the same transaction.
pub async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTemplate>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.name {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest("name must not be empty".into()));
        }
    }
    if input.settings.is_some() {
        QrStyle::from_settings(input.settings.as_ref())?;
    }

    let updated = with_user_context(&state.pool, user.user_id, false, move |conn| {
        Box::pin(async move { TemplateRepo::update(conn, id, &input).await.map_err(AppError::from) })
    })
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "QrTemplate",
        id,
    }))?;

    logging::audit(
        &state.pool,
        user.user_id,
        "template_update",
        format!("Updated template {id}"),
        serde_json::json!({ "template_id": id }),
    )
    .await;

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/templates/{id}
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = with_user_context(&state.pool, user.user_id, false, move |conn| {
        Box::pin(async move { TemplateRepo::delete(conn, id).await.map_err(AppError::from) })
    })
    .await?;

    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "QrTemplate",
            id,
        }));
    }

    logging::audit(
        &state.pool,
        user.user_id,
        "template_delete",
        format!("Deleted template {id}"),
        serde_json::json!({ "template_id": id }),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
