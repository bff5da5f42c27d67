//! Notification API handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use validator::Validate;

use craftline_core::{Email, UserId};

use crate::error::AppError;
use crate::response::ApiResponse;
use crate::services::notification::GLOBAL_HISTORY_CAP;
use crate::services::{DeliveryReport, HubStats, Notification, SendNotification};
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Build the notifications router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/notifications", post(send_notification))
        .route("/api/v1/notifications/history", get(global_history))
        .route(
            "/api/v1/notifications/channels/{channel}/history",
            get(channel_history),
        )
        .route("/api/v1/notifications/stats", get(stats))
}

/// Request for sending a notification.
#[derive(Debug, Deserialize, Validate)]
pub struct SendNotificationRequest {
    /// Channel to publish on (e.g. "orders", "inventory").
    #[validate(length(min = 1, max = 100, message = "channel must be 1-100 characters"))]
    pub channel: String,
    /// Short headline.
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    /// Message body.
    #[validate(length(min = 1, max = 2000, message = "body must be 1-2000 characters"))]
    pub body: String,
    /// Target user ids.
    #[serde(default)]
    pub user_ids: Vec<i64>,
    /// Email addresses to deliver a copy to.
    #[serde(default)]
    pub email_to: Vec<String>,
    /// Phone numbers to deliver a copy to.
    #[serde(default)]
    pub sms_to: Vec<String>,
}

/// Query parameters for history endpoints.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// Maximum number of entries to return (default 50).
    pub limit: Option<usize>,
}

impl HistoryParams {
    fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .min(GLOBAL_HISTORY_CAP)
    }
}

/// Publish a notification.
///
/// # Errors
///
/// Returns a validation error for a bad payload or malformed email address.
pub async fn send_notification(
    State(state): State<AppState>,
    Json(body): Json<SendNotificationRequest>,
) -> Result<Json<ApiResponse<DeliveryReport>>, AppError> {
    body.validate()?;

    let email_to = body
        .email_to
        .iter()
        .map(|raw| {
            Email::parse(raw)
                .map_err(|e| AppError::BadRequest(format!("invalid email address {raw:?}: {e}")))
        })
        .collect::<Result<Vec<Email>, AppError>>()?;

    let report = state
        .notifications()
        .send(SendNotification {
            channel: body.channel,
            title: body.title,
            body: body.body,
            user_ids: body.user_ids.into_iter().map(UserId::new).collect(),
            email_to,
            sms_to: body.sms_to,
        })
        .await;

    Ok(ApiResponse::ok("Notification sent", report))
}

/// Global notification history, newest first.
pub async fn global_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Json<ApiResponse<Vec<Notification>>> {
    let history = state.notifications().history(params.effective_limit());
    ApiResponse::ok("Notification history", history)
}

/// Per-channel notification history, newest first.
pub async fn channel_history(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Json<ApiResponse<Vec<Notification>>> {
    let history = state
        .notifications()
        .channel_history(&channel, params.effective_limit());
    ApiResponse::ok(format!("Notification history for {channel}"), history)
}

/// Hub counters snapshot.
pub async fn stats(State(state): State<AppState>) -> Json<ApiResponse<HubStats>> {
    ApiResponse::ok("Notification stats", state.notifications().stats())
}
