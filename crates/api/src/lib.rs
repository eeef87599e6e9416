//! QR deck API server library.
//!
//! Exposes the building blocks (config, state, error handling, auth, routes,
//! logging) so integration tests and the binary entrypoint can both access
//! them.

pub mod auth;
pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;
