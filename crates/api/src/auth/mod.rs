//! Session JWT handling and the OAuth provider client.

pub mod jwt;
pub mod oauth;
