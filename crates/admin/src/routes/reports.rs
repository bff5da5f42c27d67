//! Report generation API handlers.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use crate::error::AppError;
use crate::response::ApiResponse;
use crate::services::{ReportDescriptor, ReportFormat, ReportPayload};
use crate::state::AppState;

/// Build the reports router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/reports", post(generate_report))
}

/// Request for generating a report.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateReportRequest {
    /// Report title; also drives the stored filename.
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    /// Output format.
    pub format: ReportFormat,
    /// Summary entries rendered above the data table.
    #[serde(default)]
    pub summary: serde_json::Map<String, Value>,
    /// Data rows.
    #[serde(default)]
    pub rows: Vec<serde_json::Map<String, Value>>,
}

/// Generate a report file and return its descriptor.
///
/// # Errors
///
/// Returns a validation error for a bad payload, a 400 for PDF requests
/// past the row limit, or a 500 if rendering/storage fails.
pub async fn generate_report(
    State(state): State<AppState>,
    Json(body): Json<GenerateReportRequest>,
) -> Result<Json<ApiResponse<ReportDescriptor>>, AppError> {
    body.validate()?;

    let payload = ReportPayload {
        title: body.title,
        summary: body.summary,
        rows: body.rows,
    };
    let descriptor = state.reports().generate(&payload, body.format).await?;

    Ok(ApiResponse::ok("Report generated", descriptor))
}
