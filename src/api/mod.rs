//! REST handlers and router for Assetdesk

pub mod assets;
pub mod dashboard;
pub mod deployment;
pub mod employees;
pub mod hardware_models;
pub mod health;
pub mod invoices;
pub mod maintenance;
pub mod openapi;

use axum::{
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use axum_extra::extract::Multipart;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, AppResult},
    AppState,
};

/// Name of the multipart field carrying an uploaded CSV file
pub const UPLOAD_FIELD: &str = "file";

/// Text of the `file` field of a multipart upload
pub async fn read_csv_upload(mut multipart: Multipart) -> AppResult<String> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            return field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Unreadable upload: {}", e)));
        }
    }
    Err(AppError::BadRequest(format!("Missing '{}' field", UPLOAD_FIELD)))
}

/// CSV body served as a download named `filename`
pub fn csv_download(filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Assets
        .route("/assets", get(assets::list_assets).post(assets::create_asset))
        .route("/assets/search", get(assets::search_assets))
        .route("/assets/stats", get(assets::inventory_stats))
        .route("/assets/warranty", get(assets::warranty_report))
        .route("/assets/by-tag/:tag", get(assets::get_asset_by_tag))
        .route("/assets/bulk/state", post(assets::bulk_update_state))
        .route("/assets/bulk/delete", post(assets::bulk_delete))
        .route("/assets/import", post(assets::import_assets))
        .route("/assets/export", get(assets::export_assets))
        .route(
            "/assets/:id",
            get(assets::get_asset).put(assets::update_asset).delete(assets::delete_asset),
        )
        // Employees
        .route("/employees", get(employees::list_employees).post(employees::create_employee))
        .route("/employees/import", post(employees::import_employees))
        .route("/employees/export", get(employees::export_employees))
        .route(
            "/employees/:id",
            get(employees::get_employee)
                .put(employees::update_employee)
                .delete(employees::delete_employee),
        )
        .route("/employees/:id/assets", get(employees::employee_assets))
        // Maintenance
        .route("/maintenance", get(maintenance::list_tickets).post(maintenance::create_ticket))
        .route("/maintenance/export", get(maintenance::export_tickets))
        .route("/maintenance/bulk/status", post(maintenance::bulk_update_status))
        .route("/maintenance/history/:tag", get(maintenance::asset_history))
        .route(
            "/maintenance/:id",
            get(maintenance::get_ticket)
                .put(maintenance::update_ticket)
                .delete(maintenance::delete_ticket),
        )
        .route("/maintenance/:id/status", put(maintenance::update_status))
        .route("/maintenance/:id/comments", post(maintenance::add_comment))
        // Hardware models
        .route("/models", get(hardware_models::list_models).post(hardware_models::create_model))
        .route("/models/import", post(hardware_models::import_models))
        .route("/models/export", get(hardware_models::export_models))
        .route(
            "/models/:id",
            get(hardware_models::get_model)
                .put(hardware_models::update_model)
                .delete(hardware_models::delete_model),
        )
        // Invoices
        .route("/invoices", get(invoices::list_invoices).post(invoices::create_invoice))
        .route("/invoices/export", get(invoices::export_invoices))
        .route(
            "/invoices/:id",
            get(invoices::get_invoice)
                .put(invoices::update_invoice)
                .delete(invoices::delete_invoice),
        )
        // Deployment
        .route("/deployment/assign", post(deployment::assign))
        .route("/deployment/unassign", post(deployment::unassign))
        .route("/deployment/onboard", post(deployment::onboard))
        .route("/deployment/offboard", post(deployment::offboard))
        // Dashboard
        .route("/dashboard/stats", get(dashboard::dashboard_stats))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .merge(openapi::create_openapi_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
