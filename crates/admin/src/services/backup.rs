//! Database backup and restore via the `PostgreSQL` client tools.
//!
//! Shells out to `pg_dump`/`pg_restore` with `tokio::process`. Dumps use the
//! custom format so restores can be selective and `--clean` works. The
//! backup directory is flat; dump files are named
//! `backup-{timestamp}.dump`.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;
use tokio::process::Command;

use crate::config::BackupConfig;

/// Errors that can occur during backup operations.
#[derive(Debug, Error)]
pub enum BackupError {
    /// Filesystem operation failed.
    #[error("backup I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The client tool exited with a non-zero status.
    #[error("{program} failed: {stderr}")]
    CommandFailed {
        /// Program that failed (`pg_dump` or `pg_restore`).
        program: &'static str,
        /// Captured stderr output.
        stderr: String,
    },

    /// Filename contains path separators or traversal components.
    #[error("invalid backup filename: {0:?}")]
    InvalidFilename(String),

    /// Requested backup file does not exist.
    #[error("backup not found: {0}")]
    NotFound(String),
}

/// Metadata for one dump file.
#[derive(Debug, Clone, Serialize)]
pub struct BackupInfo {
    /// Dump filename within the backup directory.
    pub filename: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// When the dump was written.
    pub created_at: DateTime<Utc>,
}

/// Backup service driving `pg_dump`/`pg_restore`.
#[derive(Debug, Clone)]
pub struct BackupService {
    dir: PathBuf,
    database_url: SecretString,
}

impl BackupService {
    /// Create the service, creating the backup directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backup directory cannot be created.
    pub fn new(config: &BackupConfig, database_url: SecretString) -> Result<Self, BackupError> {
        std::fs::create_dir_all(&config.dir)?;
        Ok(Self {
            dir: config.dir.clone(),
            database_url,
        })
    }

    /// Dump the database to a new timestamped file.
    ///
    /// # Errors
    ///
    /// Returns an error if `pg_dump` cannot be spawned or exits non-zero.
    pub async fn create(&self) -> Result<BackupInfo, BackupError> {
        let created_at = Utc::now();
        let filename = format!("backup-{}.dump", created_at.format("%Y%m%d%H%M%S"));
        let path = self.dir.join(&filename);

        let output = Command::new("pg_dump")
            .arg("--format=custom")
            .arg("--file")
            .arg(&path)
            .arg(self.database_url.expose_secret())
            .output()
            .await?;

        if !output.status.success() {
            // Don't leave a partial dump behind
            let _ = tokio::fs::remove_file(&path).await;
            return Err(BackupError::CommandFailed {
                program: "pg_dump",
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let size_bytes = tokio::fs::metadata(&path).await?.len();
        tracing::info!(filename = %filename, size_bytes, "Database backup created");

        Ok(BackupInfo {
            filename,
            size_bytes,
            created_at,
        })
    }

    /// Restore the database from an existing dump file.
    ///
    /// Runs `pg_restore --clean --if-exists`, dropping objects before
    /// recreating them.
    ///
    /// # Errors
    ///
    /// Returns an error if the filename is unsafe, the file is missing, or
    /// `pg_restore` exits non-zero.
    pub async fn restore(&self, filename: &str) -> Result<(), BackupError> {
        validate_filename(filename)?;
        let path = self.dir.join(filename);
        if tokio::fs::metadata(&path).await.is_err() {
            return Err(BackupError::NotFound(filename.to_string()));
        }

        let output = Command::new("pg_restore")
            .arg("--clean")
            .arg("--if-exists")
            .arg("--dbname")
            .arg(self.database_url.expose_secret())
            .arg(&path)
            .output()
            .await?;

        if !output.status.success() {
            return Err(BackupError::CommandFailed {
                program: "pg_restore",
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        tracing::info!(filename = %filename, "Database restored from backup");
        Ok(())
    }

    /// List dump files, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backup directory cannot be read.
    pub async fn list(&self) -> Result<Vec<BackupInfo>, BackupError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut backups = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("dump") {
                continue;
            }
            let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let metadata = entry.metadata().await?;
            let created_at = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            backups.push(BackupInfo {
                filename: filename.to_string(),
                size_bytes: metadata.len(),
                created_at,
            });
        }

        backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(backups)
    }
}

/// Reject filenames that could escape the backup directory.
fn validate_filename(filename: &str) -> Result<(), BackupError> {
    let unsafe_name = filename.is_empty()
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains("..");
    if unsafe_name {
        return Err(BackupError::InvalidFilename(filename.to_string()));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_service(tag: &str) -> BackupService {
        let dir = std::env::temp_dir().join(format!(
            "craftline-backup-test-{tag}-{}",
            uuid::Uuid::new_v4()
        ));
        BackupService::new(
            &BackupConfig { dir },
            SecretString::from("postgres://localhost/craftline"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_only_reports_dump_files_newest_first() {
        let service = test_service("list");
        tokio::fs::write(service.dir.join("backup-20260101000000.dump"), b"a")
            .await
            .unwrap();
        tokio::fs::write(service.dir.join("notes.txt"), b"b")
            .await
            .unwrap();
        tokio::fs::write(service.dir.join("backup-20260102000000.dump"), b"cc")
            .await
            .unwrap();

        let backups = service.list().await.unwrap();
        assert_eq!(backups.len(), 2);
        assert!(backups.iter().all(|b| b.filename.ends_with(".dump")));
        assert!(backups[0].created_at >= backups[1].created_at);
    }

    #[tokio::test]
    async fn test_restore_rejects_traversal() {
        let service = test_service("traversal");
        let err = service.restore("../etc/passwd").await.unwrap_err();
        assert!(matches!(err, BackupError::InvalidFilename(_)));
    }

    #[tokio::test]
    async fn test_restore_missing_file_is_not_found() {
        let service = test_service("missing");
        let err = service.restore("backup-19990101000000.dump").await.unwrap_err();
        assert!(matches!(err, BackupError::NotFound(_)));
    }
}
