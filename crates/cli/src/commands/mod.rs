//! CLI command implementations.

pub mod export;
pub mod import;
pub mod migrate;

use iiko_connector::config::{ConfigError, IikoConfig, get_database_url};
use iiko_connector::db::{self, PgStore};
use iiko_connector::export::ExportError;
use iiko_connector::iiko::{IikoClient, IikoError};
use iiko_connector::import::ImportError;
use iiko_connector::logs::Envelope;
use iiko_connector::store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("iiko error: {0}")]
    Iiko(#[from] IikoError),

    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),

    #[error("{0}")]
    InvalidArgument(String),
}

/// Connect to the connector database.
async fn connect() -> Result<PgStore, CommandError> {
    let _ = dotenvy::dotenv();

    let database_url = get_database_url("CONNECTOR_DATABASE_URL")?;
    tracing::info!("Connecting to connector database...");
    let pool = db::create_pool(&database_url).await?;
    Ok(PgStore::new(pool))
}

/// Build the iiko client from the environment.
fn iiko_client() -> Result<(IikoClient, IikoConfig), CommandError> {
    let config = IikoConfig::from_env()?;
    let client = IikoClient::new(&config)?;
    Ok((client, config))
}

/// Print an envelope as pretty JSON on stdout.
fn print_envelope<T: Serialize>(envelope: &Envelope<T>) -> Result<(), CommandError> {
    let json = serde_json::to_string_pretty(envelope)?;
    #[allow(clippy::print_stdout)]
    {
        println!("{json}");
    }
    Ok(())
}
