//! Craftline CLI - database migrations, seeding, and backup tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! craftline migrate
//!
//! # Seed the brand hierarchies with starter data
//! craftline seed
//!
//! # Manage database backups
//! craftline backup create
//! craftline backup list
//! craftline backup restore backup-20260801120000.dump
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the brand category hierarchies
//! - `backup` - Create, list, or restore database dumps

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "craftline")]
#[command(author, version, about = "Craftline CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the brand category hierarchies
    Seed,
    /// Manage database backups
    Backup {
        #[command(subcommand)]
        action: BackupAction,
    },
}

#[derive(Subcommand)]
enum BackupAction {
    /// Create a new database dump
    Create,
    /// List existing dumps, newest first
    List,
    /// Restore the database from an existing dump
    Restore {
        /// Dump filename within the backup directory
        filename: String,
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
        Commands::Seed => commands::seed::run().await?,
        Commands::Backup { action } => match action {
            BackupAction::Create => commands::backup::create().await?,
            BackupAction::List => commands::backup::list().await?,
            BackupAction::Restore { filename } => commands::backup::restore(&filename).await?,
        },
    }
    Ok(())
}
