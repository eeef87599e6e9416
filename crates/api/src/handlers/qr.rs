//! Handlers for stateless QR rendering and payload building.
//!
//! Nothing here touches `qr_codes` rows: `/qr/generate` renders arbitrary
//! content to an image and `/qr/payload` builds the wire-format content
//! string for a given kind. Saved codes live in [`super::qr_code`].

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use qrdeck_core::qr::payload::{self, QrKind, VcardFields, WifiSecurity};
use qrdeck_core::qr::{png_data_url, render_png, render_svg, QrStyle};

use crate::error::{AppError, AppResult};
use crate::logging;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Output format for a rendered QR image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub content: String,
    /// Styling settings; `null` or absent means defaults.
    pub settings: Option<serde_json::Value>,
    #[serde(default)]
    pub format: ImageFormat,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub format: ImageFormat,
    /// `data:image/png;base64,...` for PNG output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
    /// Raw SVG markup for SVG output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub svg: Option<String>,
}

/// POST /api/v1/qr/generate
///
/// Render arbitrary content to a QR image without saving anything.
pub async fn generate(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<GenerateRequest>,
) -> AppResult<impl IntoResponse> {
    if input.content.is_empty() {
        return Err(AppError::BadRequest("content must not be empty".into()));
    }

    let style = QrStyle::from_settings(input.settings.as_ref())?;
    let response = match input.format {
        ImageFormat::Png => {
            let png = render_png(&input.content, &style)?;
            GenerateResponse {
                format: ImageFormat::Png,
                data_url: Some(png_data_url(&png)),
                svg: None,
            }
        }
        ImageFormat::Svg => GenerateResponse {
            format: ImageFormat::Svg,
            data_url: None,
            svg: Some(render_svg(&input.content, &style)?),
        },
    };

    logging::qr_generation(
        &state.pool,
        user.user_id,
        format!("Rendered ad-hoc QR ({} bytes of content)", input.content.len()),
    )
    .await;

    Ok(Json(DataResponse { data: response }))
}

/// Payload-building request, discriminated by `kind`.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PayloadRequest {
    Url {
        url: String,
    },
    Wifi {
        ssid: String,
        password: Option<String>,
        security: WifiSecurity,
        #[serde(default)]
        hidden: bool,
    },
    Vcard(VcardFields),
    Email {
        to: String,
        subject: Option<String>,
        body: Option<String>,
    },
    Sms {
        phone: String,
        message: Option<String>,
    },
    Location {
        latitude: f64,
        longitude: f64,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
pub struct PayloadResponse {
    pub kind: QrKind,
    /// The wire-format content string ready to encode or save.
    pub content: String,
}

/// POST /api/v1/qr/payload
///
/// Build the content string for a typed QR payload.
pub async fn build_payload(
    _user: AuthUser,
    Json(input): Json<PayloadRequest>,
) -> AppResult<impl IntoResponse> {
    let (kind, content) = match input {
        PayloadRequest::Url { url } => {
            if url.is_empty() {
                return Err(AppError::BadRequest("url must not be empty".into()));
            }
            (QrKind::Url, payload::url(&url))
        }
        PayloadRequest::Wifi {
            ssid,
            password,
            security,
            hidden,
        } => {
            if ssid.is_empty() {
                return Err(AppError::BadRequest("ssid must not be empty".into()));
            }
            (
                QrKind::Wifi,
                payload::wifi(&ssid, password.as_deref(), security, hidden),
            )
        }
        PayloadRequest::Vcard(fields) => {
            if fields.first_name.is_empty() && fields.last_name.is_empty() {
                return Err(AppError::BadRequest("vcard requires a name".into()));
            }
            (QrKind::Vcard, payload::vcard(&fields))
        }
        PayloadRequest::Email { to, subject, body } => {
            if to.is_empty() {
                return Err(AppError::BadRequest("to must not be empty".into()));
            }
            (
                QrKind::Email,
                payload::email(&to, subject.as_deref(), body.as_deref()),
            )
        }
        PayloadRequest::Sms { phone, message } => {
            if phone.is_empty() {
                return Err(AppError::BadRequest("phone must not be empty".into()));
            }
            (QrKind::Sms, payload::sms(&phone, message.as_deref()))
        }
        PayloadRequest::Location {
            latitude,
            longitude,
        } => {
            if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
                return Err(AppError::BadRequest("coordinates out of range".into()));
            }
            (QrKind::Location, payload::location(latitude, longitude))
        }
        PayloadRequest::Text { text } => {
            if text.is_empty() {
                return Err(AppError::BadRequest("text must not be empty".into()));
            }
            (QrKind::Text, text)
        }
    };

    Ok(Json(DataResponse {
        data: PayloadResponse { kind, content },
    }))
}
