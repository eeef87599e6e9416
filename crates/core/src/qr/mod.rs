//! QR encoding: content payload builders, styling, and image rendering.
//!
//! Rendering wraps the `qrcode` crate. Styling is a small JSON object stored
//! alongside each saved code (`settings` column) and parsed leniently:
//! unknown fields are ignored so older clients keep working.

pub mod payload;

use base64::Engine;
use image::Rgba;
use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub use payload::{QrKind, WifiSecurity};

/// Error-correction level, serialized as `l`/`m`/`q`/`h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCorrection {
    L,
    M,
    Q,
    H,
}

impl From<ErrorCorrection> for EcLevel {
    fn from(ec: ErrorCorrection) -> Self {
        match ec {
            ErrorCorrection::L => EcLevel::L,
            ErrorCorrection::M => EcLevel::M,
            ErrorCorrection::Q => EcLevel::Q,
            ErrorCorrection::H => EcLevel::H,
        }
    }
}

/// Styling options for a rendered QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QrStyle {
    /// Minimum output dimensions in pixels (square).
    pub size: u32,
    /// Whether to render the quiet zone around the modules.
    pub margin: bool,
    pub error_correction: ErrorCorrection,
    /// `#rrggbb` color of the dark modules.
    pub dark_color: String,
    /// `#rrggbb` color of the light modules.
    pub light_color: String,
}

impl Default for QrStyle {
    fn default() -> Self {
        Self {
            size: 256,
            margin: true,
            error_correction: ErrorCorrection::M,
            dark_color: "#000000".to_string(),
            light_color: "#ffffff".to_string(),
        }
    }
}

impl QrStyle {
    /// Parse a style from the stored `settings` JSON.
    ///
    /// `None` or JSON `null` yields the default style. Invalid colors are
    /// rejected here rather than at render time so API callers get a 400.
    pub fn from_settings(settings: Option<&serde_json::Value>) -> Result<Self, CoreError> {
        let style = match settings {
            None | Some(serde_json::Value::Null) => Self::default(),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| CoreError::Validation(format!("invalid QR settings: {e}")))?,
        };
        parse_hex_color(&style.dark_color)?;
        parse_hex_color(&style.light_color)?;
        if style.size == 0 || style.size > 4096 {
            return Err(CoreError::Validation(
                "QR size must be between 1 and 4096 pixels".into(),
            ));
        }
        Ok(style)
    }
}

/// Parse a `#rrggbb` hex color.
fn parse_hex_color(s: &str) -> Result<[u8; 3], CoreError> {
    let hex = s
        .strip_prefix('#')
        .ok_or_else(|| CoreError::Validation(format!("invalid color: {s}")))?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CoreError::Validation(format!("invalid color: {s}")));
    }
    let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
    let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
    let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
    Ok([r, g, b])
}

fn encode(content: &str, style: &QrStyle) -> Result<QrCode, CoreError> {
    QrCode::with_error_correction_level(content.as_bytes(), style.error_correction.into())
        .map_err(|e| CoreError::Validation(format!("cannot encode QR content: {e}")))
}

/// Render `content` as a PNG image.
pub fn render_png(content: &str, style: &QrStyle) -> Result<Vec<u8>, CoreError> {
    let code = encode(content, style)?;
    let [dr, dg, db] = parse_hex_color(&style.dark_color)?;
    let [lr, lg, lb] = parse_hex_color(&style.light_color)?;

    let img = code
        .render::<Rgba<u8>>()
        .min_dimensions(style.size, style.size)
        .quiet_zone(style.margin)
        .dark_color(Rgba([dr, dg, db, 255]))
        .light_color(Rgba([lr, lg, lb, 255]))
        .build();

    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| CoreError::Internal(format!("PNG encoding failed: {e}")))?;
    Ok(bytes)
}

/// Render `content` as an SVG document.
pub fn render_svg(content: &str, style: &QrStyle) -> Result<String, CoreError> {
    let code = encode(content, style)?;
    parse_hex_color(&style.dark_color)?;
    parse_hex_color(&style.light_color)?;

    Ok(code
        .render::<svg::Color>()
        .min_dimensions(style.size, style.size)
        .quiet_zone(style.margin)
        .dark_color(svg::Color(&style.dark_color))
        .light_color(svg::Color(&style.light_color))
        .build())
}

/// Wrap PNG bytes in a `data:image/png;base64,` URL.
pub fn png_data_url(png: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(png);
    format!("data:image/png;base64,{encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn default_style_from_missing_settings() {
        let style = QrStyle::from_settings(None).unwrap();
        assert_eq!(style, QrStyle::default());

        let style = QrStyle::from_settings(Some(&serde_json::Value::Null)).unwrap();
        assert_eq!(style, QrStyle::default());
    }

    #[test]
    fn style_ignores_unknown_fields() {
        let value = serde_json::json!({
            "size": 512,
            "error_correction": "h",
            "some_future_option": true,
        });
        let style = QrStyle::from_settings(Some(&value)).unwrap();
        assert_eq!(style.size, 512);
        assert_eq!(style.error_correction, ErrorCorrection::H);
        assert_eq!(style.dark_color, "#000000");
    }

    #[test]
    fn invalid_color_is_rejected() {
        let value = serde_json::json!({ "dark_color": "red" });
        assert_matches!(
            QrStyle::from_settings(Some(&value)),
            Err(CoreError::Validation(_))
        );

        let value = serde_json::json!({ "light_color": "#12345" });
        assert_matches!(
            QrStyle::from_settings(Some(&value)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn zero_size_is_rejected() {
        let value = serde_json::json!({ "size": 0 });
        assert_matches!(
            QrStyle::from_settings(Some(&value)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn renders_png_bytes() {
        let png = render_png("https://example.com", &QrStyle::default()).unwrap();
        // PNG magic number.
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    #[test]
    fn renders_svg_with_colors() {
        let style = QrStyle {
            dark_color: "#112233".into(),
            ..QrStyle::default()
        };
        let svg = render_svg("hello", &style).unwrap();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("#112233"));
    }

    #[test]
    fn data_url_has_png_prefix() {
        let url = png_data_url(&[1, 2, 3]);
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn oversized_content_fails_cleanly() {
        let content = "x".repeat(8000);
        assert_matches!(
            render_png(&content, &QrStyle::default()),
            Err(CoreError::Validation(_))
        );
    }
}
