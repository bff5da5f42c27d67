//! Router-level tests for the `/api/v1` surface.
//!
//! These exercise the real router and application state with a lazy
//! (unconnected) database pool; only endpoints that never touch the
//! database are driven here. Handlers backed by `PostgreSQL` are covered
//! by repository unit tests plus input-validation cases below.

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use craftline_admin::config::{AdminConfig, BackupConfig, StorageConfig};
use craftline_admin::routes;
use craftline_admin::state::AppState;

fn test_config(tag: &str) -> AdminConfig {
    let scratch = std::env::temp_dir().join(format!(
        "craftline-api-test-{tag}-{}",
        uuid::Uuid::new_v4()
    ));
    AdminConfig {
        database_url: SecretString::from("postgres://localhost/craftline_test"),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: "http://localhost:3001".to_string(),
        expose_errors: false,
        storage: StorageConfig {
            root: scratch.join("storage"),
            base_url: "http://localhost:3001/files".to_string(),
        },
        backup: BackupConfig {
            dir: scratch.join("backups"),
        },
        email: None,
        sms: None,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 1.0,
    }
}

/// Build the app with a lazy pool; no database connection is made unless a
/// handler actually queries.
fn test_app(tag: &str) -> (Router, PathBuf) {
    let config = test_config(tag);
    let storage_root = config.storage.root.clone();
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/craftline_test")
        .unwrap();
    let state = AppState::new(config, pool).unwrap();
    let app = Router::new().merge(routes::routes()).with_state(state);
    (app, storage_root)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn send_notification_and_read_history() {
    let (app, _) = test_app("notify");

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/notifications",
            &json!({
                "channel": "orders",
                "title": "New order",
                "body": "ORD-1001 placed on Indikriti",
                "user_ids": [7]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Notification sent");
    let notification = &body["data"]["notification"];
    assert_eq!(notification["channel"], "orders");
    assert!(notification["id"].as_str().is_some());
    assert_eq!(body["data"]["subscribers_notified"], 0);

    // Global history
    let response = app
        .clone()
        .oneshot(get("/api/v1/notifications/history"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "New order");

    // Channel history is isolated
    let response = app
        .clone()
        .oneshot(get("/api/v1/notifications/channels/orders/history"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(get("/api/v1/notifications/channels/tickets/history"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    // Stats
    let response = app
        .oneshot(get("/api/v1/notifications/stats"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["total_sent"], 1);
    assert_eq!(body["data"]["channels"], 1);
}

#[tokio::test]
async fn send_notification_rejects_invalid_payload() {
    let (app, _) = test_app("notify-invalid");

    let response = app
        .oneshot(post_json(
            "/api/v1/notifications",
            &json!({"channel": "", "title": "", "body": "x"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Validation failed");
    let errors = body["errors"].as_array().unwrap();
    let fields: Vec<&str> = errors
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"channel"));
    assert!(fields.contains(&"title"));
}

#[tokio::test]
async fn send_notification_rejects_malformed_email() {
    let (app, _) = test_app("notify-email");

    let response = app
        .oneshot(post_json(
            "/api/v1/notifications",
            &json!({
                "channel": "orders",
                "title": "t",
                "body": "b",
                "email_to": ["not-an-email"]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("invalid email address")
    );
}

#[tokio::test]
async fn generate_csv_report_stores_file() {
    let (app, storage_root) = test_app("report-csv");

    let response = app
        .oneshot(post_json(
            "/api/v1/reports",
            &json!({
                "title": "Daily Orders",
                "format": "csv",
                "summary": {"Total": 2},
                "rows": [
                    {"order": "ORD-1", "amount": 1200},
                    {"order": "ORD-2", "amount": 899}
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["format"], "csv");
    assert_eq!(data["row_count"], 2);
    let filename = data["filename"].as_str().unwrap();
    assert!(filename.starts_with("daily-orders-"));
    assert_eq!(
        data["url"].as_str().unwrap(),
        format!("http://localhost:3001/files/{filename}")
    );

    let contents = std::fs::read_to_string(storage_root.join(filename)).unwrap();
    assert!(contents.starts_with("order,amount"));
}

#[tokio::test]
async fn generate_pdf_report_rejects_large_datasets() {
    let (app, _) = test_app("report-pdf");

    let rows: Vec<Value> = (0..101).map(|i| json!({"i": i})).collect();
    let response = app
        .oneshot(post_json(
            "/api/v1/reports",
            &json!({"title": "Everything", "format": "pdf", "rows": rows}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("csv or excel"));
}

#[tokio::test]
async fn report_requires_title() {
    let (app, _) = test_app("report-invalid");

    let response = app
        .oneshot(post_json(
            "/api/v1/reports",
            &json!({"title": "", "format": "json"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["errors"][0]["field"], "title");
}

#[tokio::test]
async fn hierarchy_rejects_unknown_brand() {
    let (app, _) = test_app("brand");

    let response = app
        .oneshot(get("/api/v1/brands/acme/hierarchy"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("unknown brand"));
}
