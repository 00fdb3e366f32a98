//! API integration tests, driving the router in-process over the bundled fixtures

use std::sync::Arc;

use assetdesk::{
    api::create_router,
    config::AppConfig,
    repository::{fixture::FixtureSource, Repository},
    services::Services,
    AppState,
};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

const BOUNDARY: &str = "assetdesk-test-boundary";

fn app() -> Router {
    let source = FixtureSource::in_memory().expect("bundled fixtures");
    let services = Services::new(Repository::new(Arc::new(source)));
    create_router(AppState::new(AppConfig::default(), services))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

async fn upload(app: &Router, uri: &str, csv: &str) -> (StatusCode, Value) {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"upload.csv\"\r\nContent-Type: text/csv\r\n\r\n{csv}\r\n--{b}--\r\n",
        b = BOUNDARY,
        csv = csv
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_health_and_readiness() {
    let app = app();
    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (_, body) = get(&app, "/api/ready").await;
    assert_eq!(body["source"], "fixture");
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let app = app();
    let (status, body) = get(&app, "/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "Assetdesk API");
    assert_eq!(body["servers"][0]["url"], "/api");
    let paths = body["paths"].as_object().unwrap();
    for route in ["/assets/{id}", "/employees/{id}/assets", "/maintenance/{id}/status", "/deployment/offboard"] {
        assert!(paths.contains_key(route), "missing {}", route);
    }
    assert!(body["components"]["schemas"]["AssetPage"].is_object());
    assert!(body["components"]["schemas"]["ErrorResponse"].is_object());
}

#[tokio::test]
async fn test_asset_list_is_paginated_and_filtered() {
    let app = app();
    let (status, body) = get(&app, "/api/assets?page=1&pageSize=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["pagination"]["totalItems"], 12);
    assert_eq!(body["pagination"]["totalPages"], 3);

    let (_, body) = get(&app, "/api/assets?employee=UNASSIGNED").await;
    let ids: Vec<i64> = body["data"].as_array().unwrap().iter().map(|a| a["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![7, 9, 10, 12]);
}

#[tokio::test]
async fn test_unknown_asset_renders_error_envelope() {
    let app = app();
    let (status, body) = get(&app, "/api/assets/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_asset_by_tag_is_case_insensitive() {
    let app = app();
    let (status, body) = get(&app, "/api/assets/by-tag/hp840-1002").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 7);
}

#[tokio::test]
async fn test_create_and_delete_asset() {
    let app = app();
    let asset = json!({
        "category": "Monitor",
        "make": "Dell",
        "model": "P2723DE",
        "serviceTag": "MON-NEW-01",
        "state": "NEW",
        "location": "Office"
    });
    let (status, created) = post(&app, "/api/assets", asset.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();
    assert_eq!(id, 13);

    let (status, body) = post(&app, "/api/assets", asset).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (status, _) = send(&app, Method::DELETE, &format!("/api/assets/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = get(&app, &format!("/api/assets/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_assign_by_name_stores_employee_id() {
    let app = app();
    let (status, body) = post(&app, "/api/deployment/assign", json!({"assetId": 7, "employeeId": "Jane Doe"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["employee"], "EMP-007");

    let (_, assets) = get(&app, "/api/employees/EMP-007/assets").await;
    assert!(assets.as_array().unwrap().iter().any(|a| a["id"] == 7));
}

#[tokio::test]
async fn test_assign_to_inactive_employee_is_rejected() {
    let app = app();
    let (status, body) = post(&app, "/api/deployment/assign", json!({"assetId": 7, "employeeId": "EMP-008"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "BUSINESS_RULE");
}

#[tokio::test]
async fn test_offboard_returns_everything_to_stock() {
    let app = app();
    let (_, held) = get(&app, "/api/employees/EMP-001/assets").await;
    let held = held.as_array().unwrap().len();
    assert!(held > 0);

    let (status, report) = post(&app, "/api/deployment/offboard", json!({"employeeId": "EMP-001"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["processed"].as_array().unwrap().len(), held);

    let (_, after) = get(&app, "/api/employees/EMP-001/assets").await;
    assert!(after.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_maintenance_status_flow() {
    let app = app();
    let (status, record) = send(
        &app,
        Method::PUT,
        "/api/maintenance/MNT-002/status",
        Some(json!({"status": "in-progress", "note": "Picked up"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["status"], "in-progress");
    let last = record["timeline"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["title"], "Status Updated");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/maintenance/MNT-003/status",
        Some(json!({"status": "pending"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["message"], "Cannot change status from completed to pending");
}

#[tokio::test]
async fn test_comment_and_history() {
    let app = app();
    let (status, record) = post(
        &app,
        "/api/maintenance/MNT-001/comments",
        json!({"content": "Waiting on parts", "isInternal": true}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["comments"].as_array().unwrap().last().unwrap()["content"], "Waiting on parts");

    let (status, _) = post(&app, "/api/maintenance/MNT-001/comments", json!({"content": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, history) = get(&app, "/api/maintenance/history/C02XK1MBP").await;
    assert_eq!(history[0]["id"], "MNT-001");
}

#[tokio::test]
async fn test_dashboard_stats() {
    let app = app();
    let (status, stats) = get(&app, "/api/dashboard/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalAssets"]["count"], 12);
    assert_eq!(stats["deployment"]["percentage"], 67);
    assert_eq!(stats["maintenance"]["pending"], 1);
}

#[tokio::test]
async fn test_inventory_csv_import_reports_row_errors() {
    let app = app();
    let csv = "Category,Make,Model,Service Tag,Status,Assigned To\n\
               Laptop,Dell,Latitude 5440,IMP-001,NEW,Jane Doe\n\
               Laptop,Dell,Latitude 5440,DL5440-001,GOOD,\n\
               Monitor,Dell,P2723DE,IMP-002,GOOD,Nobody Here\n";
    let (status, report) = upload(&app, "/api/assets/import", csv).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["imported"], 1);
    assert_eq!(report["failed"], 2);
    assert_eq!(report["success"], false);

    let (_, asset) = get(&app, "/api/assets/by-tag/IMP-001").await;
    assert_eq!(asset["employee"], "EMP-007");
}

#[tokio::test]
async fn test_upload_without_file_field_is_bad_request() {
    let app = app();
    let body = format!("--{b}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nx\r\n--{b}--\r\n", b = BOUNDARY);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/employees/import")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_export_is_csv_attachment() {
    let app = app();
    let request = Request::builder().uri("/api/employees/export").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/csv"));
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("employees_export.csv"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(text.lines().count(), 9);
    assert!(text.contains("Kenji Sato"));
}
