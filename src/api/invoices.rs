//! Purchase invoice endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};

use super::csv_download;
use crate::{
    error::AppResult,
    models::{CreateInvoice, Invoice, InvoiceQuery, PaginatedResponse, UpdateInvoice},
    AppState,
};

#[utoipa::path(
    get,
    path = "/invoices",
    tag = "invoices",
    params(InvoiceQuery),
    responses(
        (status = 200, description = "Page of invoices", body = super::openapi::InvoicePage)
    )
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<InvoiceQuery>,
) -> AppResult<Json<PaginatedResponse<Invoice>>> {
    let page = state.services.invoices.list(&query).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/invoices/{id}",
    tag = "invoices",
    params(("id" = i64, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice details", body = Invoice),
        (status = 404, description = "Invoice not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_invoice(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Invoice>> {
    let invoice = state.services.invoices.get(id).await?;
    Ok(Json(invoice))
}

#[utoipa::path(
    post,
    path = "/invoices",
    tag = "invoices",
    request_body = CreateInvoice,
    responses(
        (status = 201, description = "Invoice created", body = Invoice),
        (status = 400, description = "Invalid invoice", body = crate::error::ErrorResponse),
        (status = 409, description = "Invoice number already in use", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(data): Json<CreateInvoice>,
) -> AppResult<(StatusCode, Json<Invoice>)> {
    let invoice = state.services.invoices.create(data).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

#[utoipa::path(
    put,
    path = "/invoices/{id}",
    tag = "invoices",
    params(("id" = i64, Path, description = "Invoice ID")),
    request_body = UpdateInvoice,
    responses(
        (status = 200, description = "Invoice updated", body = Invoice),
        (status = 404, description = "Invoice not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<UpdateInvoice>,
) -> AppResult<Json<Invoice>> {
    let invoice = state.services.invoices.update(id, data).await?;
    Ok(Json(invoice))
}

#[utoipa::path(
    delete,
    path = "/invoices/{id}",
    tag = "invoices",
    params(("id" = i64, Path, description = "Invoice ID")),
    responses(
        (status = 204, description = "Invoice deleted"),
        (status = 404, description = "Invoice not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_invoice(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    state.services.invoices.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/invoices/export",
    tag = "invoices",
    params(InvoiceQuery),
    responses(
        (status = 200, description = "Invoices as CSV", content_type = "text/csv", body = String)
    )
)]
pub async fn export_invoices(
    State(state): State<AppState>,
    Query(query): Query<InvoiceQuery>,
) -> AppResult<Response> {
    let body = state.services.invoices.export_csv(&query).await?;
    Ok(csv_download("invoices_export.csv", body))
}
