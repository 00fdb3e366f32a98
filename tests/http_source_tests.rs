//! HTTP data source against a mock backend

use assetdesk::{
    config::ApiConfig,
    models::{AssetQuery, AssetState, UpdateAsset},
    repository::{http::HttpSource, DataSource},
    AppError,
};
use serde_json::json;
use wiremock::{
    matchers::{body_json, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn source(server: &MockServer, token: Option<&str>) -> HttpSource {
    let config = ApiConfig {
        base_url: server.uri(),
        timeout_ms: 2_000,
        enable_logging: true,
        access_token: token.map(str::to_string),
    };
    HttpSource::new(&config).unwrap()
}

fn asset_json(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "category": "Laptop",
        "make": "Dell",
        "model": "Latitude 5440",
        "serviceTag": format!("DL-{}", id),
        "state": "GOOD",
        "employee": "EMP-001",
        "location": "Office"
    })
}

#[tokio::test]
async fn test_list_sends_filters_and_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/assets"))
        .and(query_param("category", "Laptop"))
        .and(query_param("page", "2"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [asset_json(7)],
            "pagination": {"page": 2, "pageSize": 1, "totalItems": 3, "totalPages": 3}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = AssetQuery {
        page: Some(2),
        category: Some("Laptop".into()),
        ..Default::default()
    };
    let page = source(&server, Some("secret")).assets_list(&query).await.unwrap();
    assert_eq!(page.data[0].id, 7);
    assert_eq!(page.pagination.total_pages, 3);
}

#[tokio::test]
async fn test_string_ids_are_sent_as_one_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/employees/AC%2FDC%3F%23"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "EMP-042",
            "fullName": "AC/DC?#",
            "email": "band@example.com",
            "department": "Music",
            "position": "Band",
            "isActive": true
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/maintenance/MNT%20001"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let source = source(&server, None);
    let employee = source.employees_get("AC/DC?#").await.unwrap();
    assert_eq!(employee.id, "EMP-042");
    source.maintenance_delete("MNT 001").await.unwrap();
}

#[tokio::test]
async fn test_update_sends_only_changed_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/assets/3"))
        .and(body_json(json!({"state": "BROKEN"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(asset_json(3)))
        .expect(1)
        .mount(&server)
        .await;

    let asset = source(&server, None)
        .assets_update(3, UpdateAsset::state(AssetState::Broken))
        .await
        .unwrap();
    assert_eq!(asset.id, 3);
}

#[tokio::test]
async fn test_unauthorized_maps_to_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/employees/EMP-001"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = source(&server, None).employees_get("EMP-001").await.unwrap_err();
    assert_eq!(err.status_code(), Some(401));
    assert_eq!(err.code(), "UNAUTHORIZED");
}

#[tokio::test]
async fn test_error_envelope_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/models/9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "NOT_FOUND", "message": "Model 9 not found", "details": {"id": 9}}
        })))
        .mount(&server)
        .await;

    let err = source(&server, None).models_get(9).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.code(), "NOT_FOUND");
    assert_eq!(err.to_string(), "Model 9 not found");
    assert_eq!(err.details(), Some(&json!({"id": 9})));
}

#[tokio::test]
async fn test_non_json_error_falls_back_to_status_line() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/invoices/1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>boom</html>"))
        .mount(&server)
        .await;

    let err = source(&server, None).invoices_delete(1).await.unwrap_err();
    match err {
        AppError::Api { status, code, message, .. } => {
            assert_eq!(status, 500);
            assert_eq!(code, None);
            assert_eq!(message, "HTTP 500: Internal Server Error");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let config = ApiConfig {
        base_url: "http://127.0.0.1:9".into(),
        timeout_ms: 2_000,
        enable_logging: false,
        access_token: None,
    };
    let err = HttpSource::new(&config).unwrap().assets_get(1).await.unwrap_err();
    assert!(matches!(err, AppError::Network(_)));
    assert_eq!(err.code(), "NETWORK_ERROR");
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/assets/1"))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_millis(500)))
        .mount(&server)
        .await;

    let config = ApiConfig {
        base_url: server.uri(),
        timeout_ms: 50,
        enable_logging: false,
        access_token: None,
    };
    let err = HttpSource::new(&config).unwrap().assets_get(1).await.unwrap_err();
    assert!(matches!(err, AppError::Timeout));
    assert_eq!(err.status_code(), Some(408));
}
