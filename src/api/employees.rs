//! Employee directory endpoints

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
    models::{Asset, CreateEmployee, Employee, EmployeeQuery, ImportResult, PaginatedResponse, UpdateEmployee},
    AppState,
};

#[utoipa::path(
    get,
    path = "/employees",
    tag = "employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Page of employees", body = super::openapi::EmployeePage)
    )
)]
pub async fn list_employees(
    State(state): State<AppState>,
    Query(query): Query<EmployeeQuery>,
) -> AppResult<Json<PaginatedResponse<Employee>>> {
    let page = state.services.employees.list(&query).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/employees/{id}",
    tag = "employees",
    params(("id" = String, Path, description = "Employee ID (EMP-nnn)")),
    responses(
        (status = 200, description = "Employee details", body = Employee),
        (status = 404, description = "Employee not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Employee>> {
    let employee = state.services.employees.get(&id).await?;
    Ok(Json(employee))
}

#[utoipa::path(
    post,
    path = "/employees",
    tag = "employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Invalid employee", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already in use", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_employee(
    State(state): State<AppState>,
    Json(data): Json<CreateEmployee>,
) -> AppResult<(StatusCode, Json<Employee>)> {
    let employee = state.services.employees.create(data).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

#[utoipa::path(
    put,
    path = "/employees/{id}",
    tag = "employees",
    params(("id" = String, Path, description = "Employee ID (EMP-nnn)")),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 404, description = "Employee not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already in use", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(data): Json<UpdateEmployee>,
) -> AppResult<Json<Employee>> {
    let employee = state.services.employees.update(&id, data).await?;
    Ok(Json(employee))
}

#[utoipa::path(
    delete,
    path = "/employees/{id}",
    tag = "employees",
    params(("id" = String, Path, description = "Employee ID (EMP-nnn)")),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 404, description = "Employee not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.employees.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Assets currently held by the employee
#[utoipa::path(
    get,
    path = "/employees/{id}/assets",
    tag = "employees",
    params(("id" = String, Path, description = "Employee ID (EMP-nnn)")),
    responses(
        (status = 200, description = "Assets held", body = Vec<Asset>),
        (status = 404, description = "Employee not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn employee_assets(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Asset>>> {
    let assets = state.services.employees.assets_of(&id).await?;
    Ok(Json(assets))
}

#[utoipa::path(
    post,
    path = "/employees/import",
    tag = "employees",
    request_body(content = String, description = "CSV file in the `file` field", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Import report", body = ImportResult),
        (status = 400, description = "Missing or unreadable upload", body = crate::error::ErrorResponse)
    )
)]
pub async fn import_employees(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<ImportResult>> {
    let text = read_csv_upload(multipart).await?;
    let report = state.services.employees.import_csv(&text).await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/employees/export",
    tag = "employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Employees as CSV", content_type = "text/csv", body = String)
    )
)]
pub async fn export_employees(
    State(state): State<AppState>,
    Query(query): Query<EmployeeQuery>,
) -> AppResult<Response> {
    let body = state.services.employees.export_csv(&query).await?;
    Ok(csv_download("employees_export.csv", body))
}
