//! Content payload builders for the supported QR code kinds.
//!
//! These produce the raw text that gets encoded into the QR modules, in the
//! de-facto wire formats scanners understand (`WIFI:`, vCard 3.0, `mailto:`,
//! `SMSTO:`, `geo:`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of a QR code, stored as lowercase text in `qr_codes.kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QrKind {
    Url,
    Wifi,
    Vcard,
    Email,
    Sms,
    Location,
    Text,
}

impl QrKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QrKind::Url => "url",
            QrKind::Wifi => "wifi",
            QrKind::Vcard => "vcard",
            QrKind::Email => "email",
            QrKind::Sms => "sms",
            QrKind::Location => "location",
            QrKind::Text => "text",
        }
    }
}

impl fmt::Display for QrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QrKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "url" => Ok(QrKind::Url),
            "wifi" => Ok(QrKind::Wifi),
            "vcard" => Ok(QrKind::Vcard),
            "email" => Ok(QrKind::Email),
            "sms" => Ok(QrKind::Sms),
            "location" => Ok(QrKind::Location),
            "text" => Ok(QrKind::Text),
            other => Err(format!("unknown QR kind: {other}")),
        }
    }
}

/// WiFi network security mode for `WIFI:` payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WifiSecurity {
    Wpa,
    Wep,
    None,
}

impl WifiSecurity {
    fn token(self) -> &'static str {
        match self {
            WifiSecurity::Wpa => "WPA",
            WifiSecurity::Wep => "WEP",
            WifiSecurity::None => "nopass",
        }
    }
}

/// Escape the characters with special meaning in `WIFI:` payloads.
fn escape_wifi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | ';' | ',' | ':' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Build a URL payload, defaulting to `https://` when no scheme is given.
pub fn url(input: &str) -> String {
    if input.contains("://") {
        input.to_string()
    } else {
        format!("https://{input}")
    }
}

/// Build a `WIFI:` network payload.
pub fn wifi(ssid: &str, password: Option<&str>, security: WifiSecurity, hidden: bool) -> String {
    let mut out = format!(
        "WIFI:T:{};S:{};",
        security.token(),
        escape_wifi(ssid)
    );
    if let Some(pw) = password {
        out.push_str(&format!("P:{};", escape_wifi(pw)));
    }
    if hidden {
        out.push_str("H:true;");
    }
    out.push(';');
    out
}

/// Fields for a vCard 3.0 payload. All fields optional except the name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VcardFields {
    pub first_name: String,
    pub last_name: String,
    pub organization: Option<String>,
    pub title: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub note: Option<String>,
}

/// Build a vCard 3.0 payload.
pub fn vcard(fields: &VcardFields) -> String {
    let full_name = [fields.first_name.as_str(), fields.last_name.as_str()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let mut lines = vec![
        "BEGIN:VCARD".to_string(),
        "VERSION:3.0".to_string(),
        format!("N:{};{};;;", fields.last_name, fields.first_name),
        format!("FN:{full_name}"),
    ];
    if let Some(org) = &fields.organization {
        lines.push(format!("ORG:{org}"));
    }
    if let Some(title) = &fields.title {
        lines.push(format!("TITLE:{title}"));
    }
    if let Some(phone) = &fields.phone {
        lines.push(format!("TEL:{phone}"));
    }
    if let Some(email) = &fields.email {
        lines.push(format!("EMAIL:{email}"));
    }
    if let Some(url) = &fields.website {
        lines.push(format!("URL:{url}"));
    }
    if let Some(addr) = &fields.address {
        lines.push(format!("ADR:;;{addr};;;;"));
    }
    if let Some(note) = &fields.note {
        lines.push(format!("NOTE:{note}"));
    }
    lines.push("END:VCARD".to_string());
    lines.join("\r\n")
}

/// Build a `mailto:` payload with optional subject and body.
pub fn email(to: &str, subject: Option<&str>, body: Option<&str>) -> String {
    let mut out = format!("mailto:{to}");
    let mut params = Vec::new();
    if let Some(s) = subject {
        params.push(format!("subject={}", urlencoding::encode(s)));
    }
    if let Some(b) = body {
        params.push(format!("body={}", urlencoding::encode(b)));
    }
    if !params.is_empty() {
        out.push('?');
        out.push_str(&params.join("&"));
    }
    out
}

/// Build an `SMSTO:` payload.
pub fn sms(phone: &str, message: Option<&str>) -> String {
    match message {
        Some(msg) => format!("SMSTO:{phone}:{msg}"),
        None => format!("SMSTO:{phone}"),
    }
}

/// Build a `geo:` payload from latitude and longitude.
pub fn location(latitude: f64, longitude: f64) -> String {
    format!("geo:{latitude},{longitude}")
}
