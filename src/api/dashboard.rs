//! Dashboard endpoint

use axum::{extract::State, Json};

use crate::{error::AppResult, models::DashboardStats, AppState};

#[utoipa::path(
    get,
    path = "/dashboard/stats",
    tag = "dashboard",
    responses(
        (status = 200, description = "Totals, deployment, stock and maintenance figures", body = DashboardStats)
    )
)]
pub async fn dashboard_stats(State(state): State<AppState>) -> AppResult<Json<DashboardStats>> {
    let stats = state.services.dashboard.stats().await?;
    Ok(Json(stats))
}
