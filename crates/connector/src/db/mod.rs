//! `PostgreSQL` storage.
//!
//! # Tables (schema `iiko`)
//!
//! - `settings` - Chosen groups and the organization/terminal/city selection (JSONB)
//! - `categories` - Storefront categories keyed by iiko group ID
//! - `products` - Storefront products keyed by iiko product ID
//! - `variations` - Size/modifier variations keyed by `(product, size, modifier)`
//! - `orders` - Order snapshots with the iiko order ID once exported
//! - `order_notes` - Notes attached to orders during export
//!
//! # Migrations
//!
//! Migrations live in `crates/connector/migrations/` and run via:
//! ```bash
//! cargo run -p iiko-cli -- migrate
//! ```
//!
//! Queries are built at runtime so the crate compiles without a live database.

mod catalog;
mod orders;
mod settings;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Apply pending migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the history is inconsistent.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Storage ports backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}
