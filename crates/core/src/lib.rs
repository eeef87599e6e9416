//! Domain logic for the QR deck backend.
//!
//! This crate has no database or HTTP dependencies so the session state
//! machine, QR payload builders, and rendering logic can be unit tested in
//! isolation and reused by any future CLI tooling.

pub mod error;
pub mod log;
pub mod qr;
pub mod session;
pub mod types;
