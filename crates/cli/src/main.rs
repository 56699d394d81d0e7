//! iiko connector CLI - migrations, imports and manual exports.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! iiko-cli migrate
//!
//! # Fetch the nomenclature and remember the organization/terminal
//! iiko-cli import refresh --organization <UUID> --terminal <UUID>
//!
//! # Import the saved group selection (or the given groups)
//! iiko-cli import run --group <GROUP_ID> --group <GROUP_ID>
//!
//! # Export a stored order, or look it up in iiko
//! iiko-cli export order 1042
//! iiko-cli export check 1042
//! ```
//!
//! # Environment Variables
//!
//! - `CONNECTOR_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `IIKO_API_LOGIN` - iiko API login (import and export commands)
//! - `IIKO_API_URL`, `IIKO_ORGANIZATION_ID`, `IIKO_TERMINAL_GROUP_ID`,
//!   `IIKO_DEFAULT_STREET`, `IIKO_DEFAULT_CITY` - as for the service

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "iiko-cli")]
#[command(author, version, about = "iiko connector CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Import nomenclature into the storefront catalog
    Import {
        #[command(subcommand)]
        action: ImportAction,
    },
    /// Export orders to iiko
    Export {
        #[command(subcommand)]
        action: ExportAction,
    },
}

#[derive(Subcommand)]
enum ImportAction {
    /// Import chosen groups and their products
    Run {
        /// iiko group ID to import (repeatable); defaults to the saved selection
        #[arg(short, long = "group")]
        groups: Vec<String>,
    },
    /// Fetch the nomenclature and save the organization/terminal selection
    Refresh {
        /// iiko organization ID
        #[arg(short, long)]
        organization: String,

        /// iiko terminal group ID
        #[arg(short, long)]
        terminal: Option<String>,
    },
}

#[derive(Subcommand)]
enum ExportAction {
    /// Send a stored order to iiko
    Order {
        /// Storefront order ID
        id: i64,
    },
    /// Look up an exported order in iiko
    Check {
        /// Storefront order ID
        id: i64,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Import { action } => match action {
            ImportAction::Run { groups } => commands::import::run(&groups).await?,
            ImportAction::Refresh {
                organization,
                terminal,
            } => commands::import::refresh(&organization, terminal.as_deref()).await?,
        },
        Commands::Export { action } => match action {
            ExportAction::Order { id } => commands::export::order(id).await?,
            ExportAction::Check { id } => commands::export::check(id).await?,
        },
    }
    Ok(())
}
