//! HTTP route handlers for the `/api/v1` surface.

pub mod backups;
pub mod hierarchy;
pub mod notifications;
pub mod reports;

use axum::Router;

use crate::state::AppState;

/// Build the combined API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(reports::router())
        .merge(notifications::router())
        .merge(hierarchy::router())
        .merge(backups::router())
}
