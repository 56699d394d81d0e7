//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! iiko-cli migrate
//! ```
//!
//! Migrations are stored in `crates/connector/migrations/`.

use iiko_connector::db;

use super::{CommandError, connect};

/// Run connector database migrations.
pub async fn run() -> Result<(), CommandError> {
    let store = connect().await?;

    tracing::info!("Running connector migrations...");
    db::migrate(store.pool()).await?;

    tracing::info!("Connector migrations complete!");
    Ok(())
}
