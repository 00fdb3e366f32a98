//! Maintenance ticket endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};

use super::csv_download;
use crate::{
    error::AppResult,
    models::{
        AddCommentRequest, BulkResult, BulkStatusRequest, CreateMaintenance, MaintenanceQuery,
        MaintenanceRecord, PaginatedResponse, StatusUpdateRequest, UpdateMaintenance,
    },
    AppState,
};

#[utoipa::path(
    get,
    path = "/maintenance",
    tag = "maintenance",
    params(MaintenanceQuery),
    responses(
        (status = 200, description = "Page of tickets", body = super::openapi::MaintenancePage)
    )
)]
pub async fn list_tickets(
    State(state): State<AppState>,
    Query(query): Query<MaintenanceQuery>,
) -> AppResult<Json<PaginatedResponse<MaintenanceRecord>>> {
    let page = state.services.maintenance.list(&query).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/maintenance/{id}",
    tag = "maintenance",
    params(("id" = String, Path, description = "Ticket ID (MNT-nnn)")),
    responses(
        (status = 200, description = "Ticket details", body = MaintenanceRecord),
        (status = 404, description = "Ticket not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MaintenanceRecord>> {
    let record = state.services.maintenance.get(&id).await?;
    Ok(Json(record))
}

#[utoipa::path(
    post,
    path = "/maintenance",
    tag = "maintenance",
    request_body = CreateMaintenance,
    responses(
        (status = 201, description = "Ticket created", body = MaintenanceRecord),
        (status = 400, description = "Invalid ticket", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_ticket(
    State(state): State<AppState>,
    Json(data): Json<CreateMaintenance>,
) -> AppResult<(StatusCode, Json<MaintenanceRecord>)> {
    let record = state.services.maintenance.create(data).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    put,
    path = "/maintenance/{id}",
    tag = "maintenance",
    params(("id" = String, Path, description = "Ticket ID (MNT-nnn)")),
    request_body = UpdateMaintenance,
    responses(
        (status = 200, description = "Ticket updated", body = MaintenanceRecord),
        (status = 404, description = "Ticket not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(data): Json<UpdateMaintenance>,
) -> AppResult<Json<MaintenanceRecord>> {
    let record = state.services.maintenance.update(&id, data).await?;
    Ok(Json(record))
}

#[utoipa::path(
    delete,
    path = "/maintenance/{id}",
    tag = "maintenance",
    params(("id" = String, Path, description = "Ticket ID (MNT-nnn)")),
    responses(
        (status = 204, description = "Ticket deleted"),
        (status = 404, description = "Ticket not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.maintenance.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Move a ticket to a new status, recorded in its timeline
#[utoipa::path(
    put,
    path = "/maintenance/{id}/status",
    tag = "maintenance",
    params(("id" = String, Path, description = "Ticket ID (MNT-nnn)")),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Status changed", body = MaintenanceRecord),
        (status = 404, description = "Ticket not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Transition not allowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> AppResult<Json<MaintenanceRecord>> {
    let record = state.services.maintenance.update_status(&id, request).await?;
    Ok(Json(record))
}

#[utoipa::path(
    post,
    path = "/maintenance/{id}/comments",
    tag = "maintenance",
    params(("id" = String, Path, description = "Ticket ID (MNT-nnn)")),
    request_body = AddCommentRequest,
    responses(
        (status = 201, description = "Comment added", body = MaintenanceRecord),
        (status = 400, description = "Empty comment", body = crate::error::ErrorResponse),
        (status = 404, description = "Ticket not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AddCommentRequest>,
) -> AppResult<(StatusCode, Json<MaintenanceRecord>)> {
    let record = state.services.maintenance.add_comment(&id, request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    post,
    path = "/maintenance/bulk/status",
    tag = "maintenance",
    request_body = BulkStatusRequest,
    responses(
        (status = 200, description = "Per-ticket outcome", body = BulkResult)
    )
)]
pub async fn bulk_update_status(
    State(state): State<AppState>,
    Json(request): Json<BulkStatusRequest>,
) -> AppResult<Json<BulkResult>> {
    let result = state
        .services
        .maintenance
        .bulk_update_status(&request.ids, request.status, request.note)
        .await?;
    Ok(Json(result))
}

/// Every ticket for one service tag, newest first
#[utoipa::path(
    get,
    path = "/maintenance/history/{tag}",
    tag = "maintenance",
    params(("tag" = String, Path, description = "Service tag, case-insensitive")),
    responses(
        (status = 200, description = "Tickets for the asset", body = Vec<MaintenanceRecord>)
    )
)]
pub async fn asset_history(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> AppResult<Json<Vec<MaintenanceRecord>>> {
    let history = state.services.maintenance.history(&tag).await?;
    Ok(Json(history))
}

#[utoipa::path(
    get,
    path = "/maintenance/export",
    tag = "maintenance",
    params(MaintenanceQuery),
    responses(
        (status = 200, description = "Tickets as CSV", content_type = "text/csv", body = String)
    )
)]
pub async fn export_tickets(
    State(state): State<AppState>,
    Query(query): Query<MaintenanceQuery>,
) -> AppResult<Response> {
    let body = state.services.maintenance.export_csv(&query).await?;
    Ok(csv_download("maintenance_export.csv", body))
}
