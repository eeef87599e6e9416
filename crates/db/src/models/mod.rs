//! Entity models (FromRow structs) and their Create/Update DTOs.

pub mod app_log;
pub mod qr_code;
pub mod template;
pub mod user;

pub use app_log::{AppLog, LogBucket, LogPage, LogQuery, LogStats, NewAppLog};
pub use qr_code::{CreateQrCode, QrCode, QrCodePage, QrCodeQuery, UpdateQrCode};
pub use template::{CreateTemplate, QrTemplate, UpdateTemplate};
pub use user::{UpsertUser, User};
