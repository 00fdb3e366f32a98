//! Deployment endpoints: assign, unassign, onboard, offboard

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::{
        Asset, AssignAssetRequest, DeploymentReport, OffboardRequest, OnboardRequest,
        UnassignAssetRequest,
    },
    AppState,
};

#[utoipa::path(
    post,
    path = "/deployment/assign",
    tag = "deployment",
    request_body = AssignAssetRequest,
    responses(
        (status = 200, description = "Asset assigned", body = Asset),
        (status = 404, description = "Asset or employee not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Employee inactive", body = crate::error::ErrorResponse)
    )
)]
pub async fn assign(
    State(state): State<AppState>,
    Json(request): Json<AssignAssetRequest>,
) -> AppResult<Json<Asset>> {
    let asset = state.services.deployment.assign(request).await?;
    Ok(Json(asset))
}

#[utoipa::path(
    post,
    path = "/deployment/unassign",
    tag = "deployment",
    request_body = UnassignAssetRequest,
    responses(
        (status = 200, description = "Asset back in stock", body = Asset),
        (status = 404, description = "Asset not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn unassign(
    State(state): State<AppState>,
    Json(request): Json<UnassignAssetRequest>,
) -> AppResult<Json<Asset>> {
    let asset = state.services.deployment.unassign(request).await?;
    Ok(Json(asset))
}

#[utoipa::path(
    post,
    path = "/deployment/onboard",
    tag = "deployment",
    request_body = OnboardRequest,
    responses(
        (status = 200, description = "Per-asset outcome", body = DeploymentReport),
        (status = 404, description = "Employee not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn onboard(
    State(state): State<AppState>,
    Json(request): Json<OnboardRequest>,
) -> AppResult<Json<DeploymentReport>> {
    let report = state.services.deployment.onboard(request).await?;
    Ok(Json(report))
}

#[utoipa::path(
    post,
    path = "/deployment/offboard",
    tag = "deployment",
    request_body = OffboardRequest,
    responses(
        (status = 200, description = "Per-asset outcome", body = DeploymentReport),
        (status = 404, description = "Employee not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn offboard(
    State(state): State<AppState>,
    Json(request): Json<OffboardRequest>,
) -> AppResult<Json<DeploymentReport>> {
    let report = state.services.deployment.offboard(request).await?;
    Ok(Json(report))
}
