//! JSON export and import of a user's QR codes and templates.
//!
//! Export produces a versioned document without row ids, so a document can
//! be imported into any account. Import validates each record individually:
//! invalid records are skipped and counted, valid ones are inserted, and
//! the report says how many of each.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use qrdeck_core::qr::payload::QrKind;
use qrdeck_core::qr::QrStyle;
use qrdeck_core::types::Timestamp;
use qrdeck_db::models::{CreateQrCode, CreateTemplate};
use qrdeck_db::repositories::{QrCodeRepo, TemplateRepo};
use qrdeck_db::rls::with_user_context;

use crate::error::{AppError, AppResult};
use crate::logging;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Format version stamped on every export document.
const EXPORT_VERSION: &str = "1";

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportedQrCode {
    pub kind: String,
    pub title: Option<String>,
    pub content: String,
    pub settings: Option<serde_json::Value>,
    #[serde(default)]
    pub is_favorite: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportedTemplate {
    pub name: String,
    pub settings: serde_json::Value,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Serialize)]
pub struct ExportDocument {
    pub version: &'static str,
    pub exported_at: Timestamp,
    pub qr_codes: Vec<ExportedQrCode>,
    pub templates: Vec<ExportedTemplate>,
}

/// GET /api/v1/transfer/export
///
/// Export all of the user's QR codes and templates as a portable JSON
/// document. Row ids and ownership are stripped.
pub async fn export(user: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let (codes, templates) = with_user_context(&state.pool, user.user_id, false, move |conn| {
        Box::pin(async move {
            let codes = QrCodeRepo::list_all(conn).await?;
            let templates = TemplateRepo::list(conn).await?;
            Ok::<_, AppError>((codes, templates))
        })
    })
    .await?;

    let document = ExportDocument {
        version: EXPORT_VERSION,
        exported_at: chrono::Utc::now(),
        qr_codes: codes
            .into_iter()
            .map(|c| ExportedQrCode {
                kind: c.kind,
                title: c.title,
                content: c.content,
                settings: c.settings,
                is_favorite: c.is_favorite,
            })
            .collect(),
        templates: templates
            .into_iter()
            .map(|t| ExportedTemplate {
                name: t.name,
                settings: t.settings,
                is_default: t.is_default,
            })
            .collect(),
    };

    logging::audit(
        &state.pool,
        user.user_id,
        "export",
        format!(
            "Exported {} QR codes and {} templates",
            document.qr_codes.len(),
            document.templates.len()
        ),
        serde_json::json!({
            "qr_codes": document.qr_codes.len(),
            "templates": document.templates.len(),
        }),
    )
    .await;

    Ok(Json(DataResponse { data: document }))
}

/// Records arrive as raw JSON so one malformed entry skips only itself.
#[derive(Debug, Deserialize)]
pub struct ImportDocument {
    pub version: Option<String>,
    #[serde(default)]
    pub qr_codes: Vec<serde_json::Value>,
    #[serde(default)]
    pub templates: Vec<serde_json::Value>,
}

#[derive(Debug, Default, Serialize)]
pub struct CollectionReport {
    pub total: usize,
    pub imported: usize,
    pub skipped: usize,
}

#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub qr_codes: CollectionReport,
    pub templates: CollectionReport,
}

/// POST /api/v1/transfer/import
///
/// Import a previously exported document. Each record is validated on its
/// own; invalid records are skipped, never failing the whole import.
pub async fn import(
    user: AuthUser,
    State(state): State<AppState>,
    Json(document): Json<ImportDocument>,
) -> AppResult<impl IntoResponse> {
    if let Some(version) = &document.version {
        if version != EXPORT_VERSION {
            return Err(AppError::BadRequest(format!(
                "unsupported export version: {version}"
            )));
        }
    }

    let mut codes = CollectionReport {
        total: document.qr_codes.len(),
        ..Default::default()
    };
    let mut templates = CollectionReport {
        total: document.templates.len(),
        ..Default::default()
    };

    let user_id = user.user_id;
    for record in document.qr_codes {
        match parse_qr_code(record) {
            Some(input) => {
                with_user_context(&state.pool, user_id, false, move |conn| {
                    Box::pin(async move {
                        QrCodeRepo::create(conn, user_id, &input)
                            .await
                            .map_err(AppError::from)
                    })
                })
                .await?;
                codes.imported += 1;
            }
            None => codes.skipped += 1,
        }
    }

    for record in document.templates {
        match parse_template(record) {
            Some(input) => {
                with_user_context(&state.pool, user_id, false, move |conn| {
                    Box::pin(async move {
                        TemplateRepo::create(conn, user_id, &input)
                            .await
                            .map_err(AppError::from)
                    })
                })
                .await?;
                templates.imported += 1;
            }
            None => templates.skipped += 1,
        }
    }

    logging::audit(
        &state.pool,
        user_id,
        "import",
        format!(
            "Imported {} of {} QR codes and {} of {} templates",
            codes.imported, codes.total, templates.imported, templates.total
        ),
        serde_json::json!({
            "qr_codes": { "imported": codes.imported, "skipped": codes.skipped },
            "templates": { "imported": templates.imported, "skipped": templates.skipped },
        }),
    )
    .await;

    Ok(Json(DataResponse {
        data: ImportReport {
            qr_codes: codes,
            templates,
        },
    }))
}

/// Validate one exported QR code record. `None` means skip.
fn parse_qr_code(record: serde_json::Value) -> Option<CreateQrCode> {
    let record: ExportedQrCode = serde_json::from_value(record).ok()?;
    record.kind.parse::<QrKind>().ok()?;
    if record.content.is_empty() {
        return None;
    }
    QrStyle::from_settings(record.settings.as_ref()).ok()?;
    Some(CreateQrCode {
        kind: record.kind,
        title: record.title,
        content: record.content,
        settings: record.settings,
    })
}

/// Validate one exported template record. `None` means skip.
fn parse_template(record: serde_json::Value) -> Option<CreateTemplate> {
    let record: ExportedTemplate = serde_json::from_value(record).ok()?;
    if record.name.trim().is_empty() {
        return None;
    }
    QrStyle::from_settings(Some(&record.settings)).ok()?;
    Some(CreateTemplate {
        name: record.name,
        settings: record.settings,
        is_default: record.is_default,
    })
}
