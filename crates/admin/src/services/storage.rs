//! Local-disk file storage for generated report files.
//!
//! Reports are written to a temp path first, then handed here. The service
//! moves them under `STORAGE_ROOT` and maps them to public URLs under
//! `STORAGE_BASE_URL`. Serving the directory is left to the router
//! (`tower-http` `ServeDir`).

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::StorageConfig;

/// Errors that can occur during file storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Filename contains path separators or traversal components.
    #[error("invalid filename: {0:?}")]
    InvalidFilename(String),
}

/// Metadata for a file placed into storage.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoredFile {
    /// Final filename under the storage root.
    pub filename: String,
    /// Public URL the file is reachable at.
    pub url: String,
    /// File size in bytes.
    pub size_bytes: u64,
}

/// Local-disk file storage rooted at a single directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
    base_url: String,
}

impl FileStorage {
    /// Create the storage service, creating the root directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be created.
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&config.root)?;
        Ok(Self {
            root: config.root.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Directory files are stored under.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Public URL for a stored filename.
    #[must_use]
    pub fn url_for(&self, filename: &str) -> String {
        format!("{}/{filename}", self.base_url)
    }

    /// Move a temp file into storage under `filename`.
    ///
    /// If `filename` is already taken, a short unique suffix is inserted
    /// before the extension rather than overwriting the existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the filename is unsafe or the move fails.
    pub async fn store(
        &self,
        temp_path: &Path,
        filename: &str,
    ) -> Result<StoredFile, StorageError> {
        validate_filename(filename)?;

        let final_name = self.available_name(filename).await;
        let target = self.root.join(&final_name);

        // Rename fails across filesystems (temp dirs are often tmpfs);
        // fall back to copy + remove.
        if tokio::fs::rename(temp_path, &target).await.is_err() {
            tokio::fs::copy(temp_path, &target).await?;
            tokio::fs::remove_file(temp_path).await?;
        }

        let size_bytes = tokio::fs::metadata(&target).await?.len();

        Ok(StoredFile {
            url: self.url_for(&final_name),
            filename: final_name,
            size_bytes,
        })
    }

    /// Delete a stored file. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the filename is unsafe or deletion fails.
    pub async fn delete(&self, filename: &str) -> Result<bool, StorageError> {
        validate_filename(filename)?;
        match tokio::fs::remove_file(self.root.join(filename)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Find a filename that is free under the root.
    async fn available_name(&self, filename: &str) -> String {
        if !path_exists(&self.root.join(filename)).await {
            return filename.to_string();
        }

        let (stem, ext) = match filename.rsplit_once('.') {
            Some((stem, ext)) => (stem, Some(ext)),
            None => (filename, None),
        };
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let short = &suffix[..8];
        ext.map_or_else(
            || format!("{stem}-{short}"),
            |ext| format!("{stem}-{short}.{ext}"),
        )
    }
}

async fn path_exists(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok()
}

/// Reject filenames that could escape the storage root.
fn validate_filename(filename: &str) -> Result<(), StorageError> {
    let unsafe_name = filename.is_empty()
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains("..");
    if unsafe_name {
        return Err(StorageError::InvalidFilename(filename.to_string()));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;

    fn temp_storage(tag: &str) -> FileStorage {
        let root = std::env::temp_dir().join(format!(
            "craftline-storage-test-{tag}-{}",
            uuid::Uuid::new_v4()
        ));
        FileStorage::new(&StorageConfig {
            root,
            base_url: "http://localhost:3001/files/".to_string(),
        })
        .unwrap()
    }

    async fn write_temp(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("craftline-tmp-{}", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, contents).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_store_moves_file_and_builds_url() {
        let storage = temp_storage("store");
        let temp = write_temp("hello").await;

        let stored = storage.store(&temp, "report.csv").await.unwrap();

        assert_eq!(stored.filename, "report.csv");
        assert_eq!(stored.url, "http://localhost:3001/files/report.csv");
        assert_eq!(stored.size_bytes, 5);
        assert!(storage.root().join("report.csv").exists());
        assert!(!temp.exists());
    }

    #[tokio::test]
    async fn test_store_disambiguates_duplicate_names() {
        let storage = temp_storage("dup");

        let first = storage
            .store(&write_temp("one").await, "report.csv")
            .await
            .unwrap();
        let second = storage
            .store(&write_temp("two").await, "report.csv")
            .await
            .unwrap();

        assert_eq!(first.filename, "report.csv");
        assert_ne!(second.filename, "report.csv");
        assert!(second.filename.starts_with("report-"));
        assert!(second.filename.ends_with(".csv"));
    }

    #[tokio::test]
    async fn test_store_rejects_traversal() {
        let storage = temp_storage("traversal");
        let temp = write_temp("x").await;

        let err = storage.store(&temp, "../escape.csv").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidFilename(_)));

        let err = storage.store(&temp, "a/b.csv").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidFilename(_)));
    }

    #[tokio::test]
    async fn test_delete_reports_missing_files() {
        let storage = temp_storage("delete");
        let stored = storage
            .store(&write_temp("bye").await, "gone.csv")
            .await
            .unwrap();

        assert!(storage.delete(&stored.filename).await.unwrap());
        assert!(!storage.delete(&stored.filename).await.unwrap());
    }
}
