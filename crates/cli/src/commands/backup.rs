//! Database backup commands.
//!
//! Drives the same `BackupService` the API uses, so dumps created from the
//! CLI and from `/api/v1/backups` land in the same directory.
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//! - `BACKUP_DIR` - Dump directory (default: ./backups)

use std::path::PathBuf;

use craftline_admin::config::BackupConfig;
use craftline_admin::services::BackupService;

use super::{CommandError, database_url};

fn service() -> Result<BackupService, CommandError> {
    dotenvy::dotenv().ok();

    let dir = PathBuf::from(std::env::var("BACKUP_DIR").unwrap_or_else(|_| "./backups".into()));
    Ok(BackupService::new(&BackupConfig { dir }, database_url()?)?)
}

/// Create a new database dump.
///
/// # Errors
///
/// Returns an error if the database URL is missing or `pg_dump` fails.
pub async fn create() -> Result<(), CommandError> {
    let info = service()?.create().await?;
    tracing::info!(
        filename = %info.filename,
        size_bytes = info.size_bytes,
        "Backup created"
    );
    Ok(())
}

/// List existing dumps, newest first.
///
/// # Errors
///
/// Returns an error if the backup directory cannot be read.
pub async fn list() -> Result<(), CommandError> {
    let backups = service()?.list().await?;

    if backups.is_empty() {
        tracing::info!("No backups found");
        return Ok(());
    }

    #[allow(clippy::print_stdout)]
    for backup in backups {
        println!(
            "{}\t{} bytes\t{}",
            backup.filename,
            backup.size_bytes,
            backup.created_at.to_rfc3339()
        );
    }
    Ok(())
}

/// Restore the database from an existing dump.
///
/// # Errors
///
/// Returns an error if the dump is missing or `pg_restore` fails.
pub async fn restore(filename: &str) -> Result<(), CommandError> {
    service()?.restore(filename).await?;
    tracing::info!(filename = %filename, "Database restored");
    Ok(())
}
