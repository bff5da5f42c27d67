//! Database backup API handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};

use crate::error::AppError;
use crate::response::ApiResponse;
use crate::services::BackupInfo;
use crate::state::AppState;

/// Build the backups router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/backups", post(create_backup).get(list_backups))
        .route("/api/v1/backups/{filename}/restore", post(restore_backup))
}

/// Create a new database dump.
///
/// # Errors
///
/// Returns a 500 if `pg_dump` fails.
pub async fn create_backup(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<BackupInfo>>, AppError> {
    let info = state.backups().create().await?;
    Ok(ApiResponse::ok("Backup created", info))
}

/// List existing dumps, newest first.
///
/// # Errors
///
/// Returns a 500 if the backup directory cannot be read.
pub async fn list_backups(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BackupInfo>>>, AppError> {
    let backups = state.backups().list().await?;
    Ok(ApiResponse::ok("Backups", backups))
}

/// Restore the database from an existing dump.
///
/// # Errors
///
/// Returns a 404 for a missing dump, 400 for an unsafe filename, or a 500
/// if `pg_restore` fails.
pub async fn restore_backup(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.backups().restore(&filename).await?;
    Ok(ApiResponse::message(format!("Restored from {filename}")))
}
