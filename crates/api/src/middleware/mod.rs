//! Request middleware: authentication extractors and access logging.

pub mod access_log;
pub mod auth;
pub mod rbac;

pub use auth::AuthUser;
pub use rbac::RequireAdmin;
