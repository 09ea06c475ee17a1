//! End-to-end checks of the reqwest transport against a loopback server.

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use shavelog::api::{ApiClient, ApiError};
use shavelog::config::{ClientConfig, Timeouts};
use shavelog::model::{CreateRazorRequest, PageParams};

async fn list_razors(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let page: u32 = query.get("page").and_then(|v| v.parse().ok()).unwrap_or(1);
    let page_size: u32 = query.get("page_size").and_then(|v| v.parse().ok()).unwrap_or(10);
    Json(json!({
        "success": true,
        "message": "ok",
        "data": {
            "items": [{ "id": 11, "brand": "Merkur", "model": "34C", "notes": null }],
            "page": page,
            "page_size": page_size,
            "total": 25,
            "total_pages": 3
        }
    }))
}

async fn create_razor(Json(body): Json<Value>) -> Json<Value> {
    let mut razor = body;
    razor["id"] = json!(1);
    Json(json!({ "success": true, "message": "created", "data": razor }))
}

async fn get_razor(Path(id): Path<u64>) -> impl IntoResponse {
    if id == 999 {
        let body = json!({ "success": false, "message": "operation failed", "error": "record not found" });
        return (StatusCode::NOT_FOUND, Json(body));
    }
    (StatusCode::OK, Json(json!({ "success": true, "message": "ok", "data": { "id": id, "brand": "Merkur", "model": "34C" } })))
}

async fn statistics() -> impl IntoResponse {
    (StatusCode::BAD_GATEWAY, "upstream unavailable")
}

async fn slow_dashboard() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!({ "success": true, "message": "ok" }))
}

async fn health() -> Json<Value> {
    Json(json!({ "success": true, "message": "ok", "data": { "status": "healthy", "timestamp": "2024-01-01 00:00:00" } }))
}

async fn spawn_backend() -> ClientConfig {
    let app = Router::new()
        .route("/health", get(health))
        .route("/api/v1/razors", get(list_razors).post(create_razor))
        .route("/api/v1/razors/{id}", get(get_razor))
        .route("/api/v1/statistics", get(statistics))
        .route("/api/v1/dashboard", get(slow_dashboard));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    ClientConfig::new(&format!("http://{addr}/"))
        .unwrap()
        .with_timeouts(Timeouts { request_secs: 1, connect_secs: 1 })
}

#[tokio::test]
async fn list_sends_paging_query() {
    let client = ApiClient::from_config(&spawn_backend().await).unwrap();

    let envelope = client.razors().get_list(Some(PageParams::new(2, 10))).await.unwrap();
    let page = envelope.data.unwrap();
    assert_eq!(page.page, 2);
    assert_eq!(page.page_size, 10);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items[0].notes, "");
}

#[tokio::test]
async fn create_posts_json_body() {
    let client = ApiClient::from_config(&spawn_backend().await).unwrap();

    let envelope = client.razors().create(&CreateRazorRequest::new("Merkur", "34C")).await.unwrap();
    let razor = envelope.data.unwrap();
    assert_eq!(razor.id, 1);
    assert_eq!(razor.model, "34C");
}

#[tokio::test]
async fn failure_envelope_with_404_is_not_an_error() {
    let client = ApiClient::from_config(&spawn_backend().await).unwrap();

    let envelope = client.razors().get_by_id(999).await.unwrap();
    assert!(!envelope.success);
    assert_eq!(envelope.failure_reason(), "record not found");
}

#[tokio::test]
async fn plain_error_status_is_reported() {
    let client = ApiClient::from_config(&spawn_backend().await).unwrap();

    let err = client.statistics().await.unwrap_err();
    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status, 502);
            assert_eq!(body, "upstream unavailable");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn slow_backend_times_out() {
    let client = ApiClient::from_config(&spawn_backend().await).unwrap();

    let err = client.dashboard().await.unwrap_err();
    assert!(matches!(err, ApiError::Timeout(1)));
    assert!(err.retryable());
}

#[tokio::test]
async fn health_is_served_from_root() {
    let client = ApiClient::from_config(&spawn_backend().await).unwrap();

    let health = client.health().await.unwrap().data.unwrap();
    assert!(health.is_healthy());
}
