//! Unified error handling for the admin API.
//!
//! Every handler returns `Result<_, AppError>`; the `IntoResponse` impl maps
//! errors to the uniform `{success: false, message, ...}` envelope. Server
//! errors hide internal detail from clients unless `ADMIN_EXPOSE_ERRORS` is
//! set (development only), and are captured by Sentry when configured.

use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::response::{ApiErrorBody, FieldError};
use crate::services::{BackupError, ReportError, StorageError};

/// Whether 500 envelopes carry internal error detail. Set once at startup
/// from `AdminConfig::expose_errors`.
static EXPOSE_ERRORS: AtomicBool = AtomicBool::new(false);

/// Configure error detail exposure (development only).
pub fn set_expose_errors(expose: bool) {
    EXPOSE_ERRORS.store(expose, Ordering::Relaxed);
}

fn expose_errors() -> bool {
    EXPOSE_ERRORS.load(Ordering::Relaxed)
}

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request payload failed validation.
    #[error("Validation failed")]
    Validation(#[from] validator::ValidationErrors),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Report generation failed.
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// File storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Backup operation failed.
    #[error("Backup error: {0}")]
    Backup(#[from] BackupError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status the error maps to.
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::NotFound) | Self::Backup(BackupError::NotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            Self::Database(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Report(ReportError::TooManyRowsForPdf { .. })
            | Self::Storage(StorageError::InvalidFilename(_))
            | Self::Backup(BackupError::InvalidFilename(_)) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Report(_) | Self::Storage(_) | Self::Backup(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log and capture server errors
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let errors = match &self {
            Self::Validation(validation) => Some(validation_field_errors(validation)),
            _ => None,
        };

        // Don't expose internal error details to clients
        let (message, detail) = if status.is_server_error() {
            let detail = expose_errors().then(|| self.to_string());
            ("Internal server error".to_string(), detail)
        } else {
            (self.to_string(), None)
        };

        let body = ApiErrorBody {
            success: false,
            message,
            errors,
            error: detail,
        };

        (status, Json(body)).into_response()
    }
}

/// Flatten `validator` errors into the envelope's `errors` array.
fn validation_field_errors(errors: &validator::ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: e.message.as_ref().map_or_else(
                    || format!("invalid value ({})", e.code),
                    std::string::ToString::to_string,
                ),
            })
        })
        .collect();
    // Deterministic order for clients and tests
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}
