//! HTTP middleware for the connector.

pub mod auth;

pub use auth::require_admin_token;
