//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods.
//! Repositories over user-owned tables (`qr_codes`, `qr_templates`) take a
//! `&mut PgConnection` so callers run them on a connection scoped by
//! [`crate::rls::with_user_context`]; the rest take `&PgPool`.

pub mod app_log_repo;
pub mod qr_code_repo;
pub mod template_repo;
pub mod user_repo;

pub use app_log_repo::AppLogRepo;
pub use qr_code_repo::QrCodeRepo;
pub use template_repo::TemplateRepo;
pub use user_repo::UserRepo;
