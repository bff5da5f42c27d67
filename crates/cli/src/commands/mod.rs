//! CLI command implementations.

pub mod backup;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use thiserror::Error;

/// Errors shared by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Backup error: {0}")]
    Backup(#[from] craftline_admin::services::BackupError),
}

/// Resolve the database URL from `ADMIN_DATABASE_URL` or `DATABASE_URL`.
pub fn database_url() -> Result<SecretString, CommandError> {
    std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("ADMIN_DATABASE_URL"))
}
