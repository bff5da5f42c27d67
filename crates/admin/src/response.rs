//! Uniform JSON response envelope for the `/api/v1` surface.
//!
//! Every endpoint responds with `{ "success": bool, "message": string,
//! "data": ... }` so the storefront admin clients can handle responses
//! uniformly. Validation failures additionally carry an `errors` array of
//! `{field, message}` records.

use axum::Json;
use serde::Serialize;

/// Success envelope returned by every `/api/v1` endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Always `true` for success envelopes.
    pub success: bool,
    /// Human-readable outcome description.
    pub message: String,
    /// Endpoint-specific payload, omitted when there is none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Build a success envelope carrying `data`.
    pub fn ok(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data: Some(data),
        })
    }
}

impl ApiResponse<()> {
    /// Build a success envelope with no payload.
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data: None,
        })
    }
}

/// A single field validation failure, express-validator style.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    /// Name of the offending field.
    pub field: String,
    /// What was wrong with it.
    pub message: String,
}

/// Failure envelope; produced by `AppError::into_response`.
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    /// Always `false` for failure envelopes.
    pub success: bool,
    /// Human-readable failure description.
    pub message: String,
    /// Per-field validation failures, present only for 400 validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    /// Internal error detail, present only when `ADMIN_EXPOSE_ERRORS` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let Json(body) = ApiResponse::ok("Report generated", serde_json::json!({"rows": 3}));
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Report generated");
        assert_eq!(json["data"]["rows"], 3);
    }

    #[test]
    fn test_message_only_envelope_omits_data() {
        let Json(body) = ApiResponse::message("Backup restored");
        let json = serde_json::to_string(&body).expect("serialize");
        assert!(!json.contains("\"data\""));
    }

    #[test]
    fn test_error_body_omits_empty_fields() {
        let body = ApiErrorBody {
            success: false,
            message: "Internal server error".to_string(),
            errors: None,
            error: None,
        };
        let json = serde_json::to_string(&body).expect("serialize");
        assert_eq!(json, "{\"success\":false,\"message\":\"Internal server error\"}");
    }
}
