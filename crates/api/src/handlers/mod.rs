//! HTTP request handlers, one module per resource.

pub mod admin;
pub mod auth;
pub mod qr;
pub mod qr_code;
pub mod template;
pub mod transfer;
