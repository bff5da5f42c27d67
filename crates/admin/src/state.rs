//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;

use crate::config::AdminConfig;
use crate::services::{
    BackupError, BackupService, EmailService, FileStorage, NotificationHub, ReportService,
    SmsService, StorageError,
};

/// Errors that can occur while wiring up application state.
#[derive(Debug, Error)]
pub enum StateError {
    /// File storage root could not be prepared.
    #[error("storage initialization failed: {0}")]
    Storage(#[from] StorageError),

    /// Backup directory could not be prepared.
    #[error("backup initialization failed: {0}")]
    Backup(#[from] BackupError),

    /// SMTP transport could not be constructed.
    #[error("SMTP initialization failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Application state shared across all handlers.
///
/// Cheap to clone; the inner state lives behind an `Arc`. Services are
/// constructed once here and injected, never global singletons.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    storage: FileStorage,
    reports: ReportService,
    notifications: NotificationHub,
    backups: BackupService,
}

impl AppState {
    /// Build the application state from configuration and a database pool.
    ///
    /// Email and SMS delivery are enabled only when their configuration
    /// groups are present.
    ///
    /// # Errors
    ///
    /// Returns error if the storage root or backup directory cannot be
    /// created, or the SMTP transport cannot be constructed.
    pub fn new(config: AdminConfig, pool: PgPool) -> Result<Self, StateError> {
        let storage = FileStorage::new(&config.storage)?;
        let reports = ReportService::new(storage.clone());

        let email = config.email().map(EmailService::new).transpose()?;
        let sms = config.sms().cloned().map(SmsService::new);
        let notifications = NotificationHub::new(email, sms);

        let backups = BackupService::new(&config.backup, config.database_url.clone())?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                storage,
                reports,
                notifications,
                backups,
            }),
        })
    }

    /// Application configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// File storage for generated reports.
    #[must_use]
    pub fn storage(&self) -> &FileStorage {
        &self.inner.storage
    }

    /// Report generation service.
    #[must_use]
    pub fn reports(&self) -> &ReportService {
        &self.inner.reports
    }

    /// In-process notification hub.
    #[must_use]
    pub fn notifications(&self) -> &NotificationHub {
        &self.inner.notifications
    }

    /// Database backup service.
    #[must_use]
    pub fn backups(&self) -> &BackupService {
        &self.inner.backups
    }
}
