//! Hardware model catalogue endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use axum_extra::extract::Multipart;

use super::{csv_download, read_csv_upload};
use crate::{
    error::AppResult,
    models::{CreateHardwareModel, HardwareModel, ImportResult, ModelQuery, PaginatedResponse, UpdateHardwareModel},
    AppState,
};

#[utoipa::path(
    get,
    path = "/models",
    tag = "models",
    params(ModelQuery),
    responses(
        (status = 200, description = "Page of hardware models", body = super::openapi::ModelPage)
    )
)]
pub async fn list_models(
    State(state): State<AppState>,
    Query(query): Query<ModelQuery>,
) -> AppResult<Json<PaginatedResponse<HardwareModel>>> {
    let page = state.services.hardware_models.list(&query).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/models/{id}",
    tag = "models",
    params(("id" = i64, Path, description = "Model ID")),
    responses(
        (status = 200, description = "Model details", body = HardwareModel),
        (status = 404, description = "Model not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_model(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<HardwareModel>> {
    let model = state.services.hardware_models.get(id).await?;
    Ok(Json(model))
}

#[utoipa::path(
    post,
    path = "/models",
    tag = "models",
    request_body = CreateHardwareModel,
    responses(
        (status = 201, description = "Model created", body = HardwareModel),
        (status = 409, description = "Make and name already catalogued", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_model(
    State(state): State<AppState>,
    Json(data): Json<CreateHardwareModel>,
) -> AppResult<(StatusCode, Json<HardwareModel>)> {
    let model = state.services.hardware_models.create(data).await?;
    Ok((StatusCode::CREATED, Json(model)))
}

#[utoipa::path(
    put,
    path = "/models/{id}",
    tag = "models",
    params(("id" = i64, Path, description = "Model ID")),
    request_body = UpdateHardwareModel,
    responses(
        (status = 200, description = "Model updated", body = HardwareModel),
        (status = 404, description = "Model not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_model(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<UpdateHardwareModel>,
) -> AppResult<Json<HardwareModel>> {
    let model = state.services.hardware_models.update(id, data).await?;
    Ok(Json(model))
}

#[utoipa::path(
    delete,
    path = "/models/{id}",
    tag = "models",
    params(("id" = i64, Path, description = "Model ID")),
    responses(
        (status = 204, description = "Model deleted"),
        (status = 404, description = "Model not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_model(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    state.services.hardware_models.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/models/import",
    tag = "models",
    request_body(content = String, description = "CSV file in the `file` field", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Import report", body = ImportResult),
        (status = 400, description = "Missing or unreadable upload", body = crate::error::ErrorResponse)
    )
)]
pub async fn import_models(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<ImportResult>> {
    let text = read_csv_upload(multipart).await?;
    let report = state.services.hardware_models.import_csv(&text).await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/models/export",
    tag = "models",
    params(ModelQuery),
    responses(
        (status = 200, description = "Models as CSV", content_type = "text/csv", body = String)
    )
)]
pub async fn export_models(
    State(state): State<AppState>,
    Query(query): Query<ModelQuery>,
) -> AppResult<Response> {
    let body = state.services.hardware_models.export_csv(&query).await?;
    Ok(csv_download("models_export.csv", body))
}
