//! Asset inventory endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use axum_extra::extract::Multipart;
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;

use super::{csv_download, read_csv_upload};
use crate::{
    error::AppResult,
    models::{
        Asset, AssetQuery, BulkDeleteRequest, BulkResult, BulkStateRequest, CreateAsset,
        ImportResult, InventoryStats, PaginatedResponse, UpdateAsset, WarrantyInfo,
    },
    AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Free-text term matched against every field
    #[serde(default)]
    pub q: String,
}

/// List assets, filtered and paginated
#[utoipa::path(
    get,
    path = "/assets",
    tag = "assets",
    params(AssetQuery),
    responses(
        (status = 200, description = "Page of assets", body = super::openapi::AssetPage)
    )
)]
pub async fn list_assets(
    State(state): State<AppState>,
    Query(query): Query<AssetQuery>,
) -> AppResult<Json<PaginatedResponse<Asset>>> {
    let page = state.services.inventory.list(&query).await?;
    Ok(Json(page))
}

/// First matches for a free-text term (`?q=`)
#[utoipa::path(
    get,
    path = "/assets/search",
    tag = "assets",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching assets", body = Vec<Asset>)
    )
)]
pub async fn search_assets(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<Asset>>> {
    let assets = state.services.inventory.search(&params.q).await?;
    Ok(Json(assets))
}

#[utoipa::path(
    get,
    path = "/assets/{id}",
    tag = "assets",
    params(("id" = i64, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset details", body = Asset),
        (status = 404, description = "Asset not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_asset(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Asset>> {
    let asset = state.services.inventory.get(id).await?;
    Ok(Json(asset))
}

#[utoipa::path(
    get,
    path = "/assets/by-tag/{tag}",
    tag = "assets",
    params(("tag" = String, Path, description = "Service tag, case-insensitive")),
    responses(
        (status = 200, description = "Asset details", body = Asset),
        (status = 404, description = "No asset with this tag", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_asset_by_tag(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> AppResult<Json<Asset>> {
    let asset = state.services.inventory.get_by_service_tag(&tag).await?;
    Ok(Json(asset))
}

#[utoipa::path(
    post,
    path = "/assets",
    tag = "assets",
    request_body = CreateAsset,
    responses(
        (status = 201, description = "Asset created", body = Asset),
        (status = 400, description = "Invalid asset", body = crate::error::ErrorResponse),
        (status = 409, description = "Service tag already in use", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_asset(
    State(state): State<AppState>,
    Json(data): Json<CreateAsset>,
) -> AppResult<(StatusCode, Json<Asset>)> {
    let asset = state.services.inventory.create(data).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

#[utoipa::path(
    put,
    path = "/assets/{id}",
    tag = "assets",
    params(("id" = i64, Path, description = "Asset ID")),
    request_body = UpdateAsset,
    responses(
        (status = 200, description = "Asset updated", body = Asset),
        (status = 404, description = "Asset not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Service tag already in use", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_asset(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<UpdateAsset>,
) -> AppResult<Json<Asset>> {
    let asset = state.services.inventory.update(id, data).await?;
    Ok(Json(asset))
}

#[utoipa::path(
    delete,
    path = "/assets/{id}",
    tag = "assets",
    params(("id" = i64, Path, description = "Asset ID")),
    responses(
        (status = 204, description = "Asset deleted"),
        (status = 404, description = "Asset not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_asset(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    state.services.inventory.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/assets/bulk/state",
    tag = "assets",
    request_body = BulkStateRequest,
    responses(
        (status = 200, description = "Per-asset outcome", body = BulkResult)
    )
)]
pub async fn bulk_update_state(
    State(state): State<AppState>,
    Json(request): Json<BulkStateRequest>,
) -> AppResult<Json<BulkResult>> {
    let result = state
        .services
        .inventory
        .bulk_update_state(&request.ids, request.state)
        .await?;
    Ok(Json(result))
}

#[utoipa::path(
    post,
    path = "/assets/bulk/delete",
    tag = "assets",
    request_body = BulkDeleteRequest,
    responses(
        (status = 200, description = "Per-asset outcome", body = BulkResult)
    )
)]
pub async fn bulk_delete(
    State(state): State<AppState>,
    Json(request): Json<BulkDeleteRequest>,
) -> AppResult<Json<BulkResult>> {
    let result = state.services.inventory.bulk_delete(&request.ids).await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/assets/stats",
    tag = "assets",
    responses(
        (status = 200, description = "Inventory counts", body = InventoryStats)
    )
)]
pub async fn inventory_stats(State(state): State<AppState>) -> AppResult<Json<InventoryStats>> {
    let stats = state.services.inventory.stats().await?;
    Ok(Json(stats))
}

/// Assets with a warranty date, soonest expiry first
#[utoipa::path(
    get,
    path = "/assets/warranty",
    tag = "assets",
    responses(
        (status = 200, description = "Warranty report", body = Vec<WarrantyInfo>)
    )
)]
pub async fn warranty_report(State(state): State<AppState>) -> AppResult<Json<Vec<WarrantyInfo>>> {
    let today = Utc::now().date_naive();
    let report = state.services.inventory.warranty_report(today).await?;
    Ok(Json(report))
}

/// Import assets from the uploaded CSV file
#[utoipa::path(
    post,
    path = "/assets/import",
    tag = "assets",
    request_body(content = String, description = "CSV file in the `file` field", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Import report", body = ImportResult),
        (status = 400, description = "Missing or unreadable upload", body = crate::error::ErrorResponse)
    )
)]
pub async fn import_assets(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<ImportResult>> {
    let text = read_csv_upload(multipart).await?;
    let report = state.services.inventory.import_csv(&text).await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/assets/export",
    tag = "assets",
    params(AssetQuery),
    responses(
        (status = 200, description = "Inventory as CSV", content_type = "text/csv", body = String)
    )
)]
pub async fn export_assets(
    State(state): State<AppState>,
    Query(query): Query<AssetQuery>,
) -> AppResult<Response> {
    let body = state.services.inventory.export_csv(&query).await?;
    Ok(csv_download("inventory_export.csv", body))
}
