//! OpenAPI documentation

use axum::Router;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{assets, dashboard, deployment, employees, hardware_models, health, invoices, maintenance};
use crate::models::{
    Asset, Employee, HardwareModel, Invoice, MaintenanceRecord, PaginationMeta,
};

/// Page of assets
#[derive(Serialize, ToSchema)]
pub struct AssetPage {
    pub data: Vec<Asset>,
    pub pagination: PaginationMeta,
}

/// Page of employees
#[derive(Serialize, ToSchema)]
pub struct EmployeePage {
    pub data: Vec<Employee>,
    pub pagination: PaginationMeta,
}

/// Page of maintenance tickets
#[derive(Serialize, ToSchema)]
pub struct MaintenancePage {
    pub data: Vec<MaintenanceRecord>,
    pub pagination: PaginationMeta,
}

/// Page of hardware models
#[derive(Serialize, ToSchema)]
pub struct ModelPage {
    pub data: Vec<HardwareModel>,
    pub pagination: PaginationMeta,
}

/// Page of invoices
#[derive(Serialize, ToSchema)]
pub struct InvoicePage {
    pub data: Vec<Invoice>,
    pub pagination: PaginationMeta,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Assetdesk API",
        version = "1.0.0",
        description = "IT asset management REST API",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Assets
        assets::list_assets,
        assets::search_assets,
        assets::get_asset,
        assets::get_asset_by_tag,
        assets::create_asset,
        assets::update_asset,
        assets::delete_asset,
        assets::bulk_update_state,
        assets::bulk_delete,
        assets::inventory_stats,
        assets::warranty_report,
        assets::import_assets,
        assets::export_assets,
        // Employees
        employees::list_employees,
        employees::get_employee,
        employees::create_employee,
        employees::update_employee,
        employees::delete_employee,
        employees::employee_assets,
        employees::import_employees,
        employees::export_employees,
        // Maintenance
        maintenance::list_tickets,
        maintenance::get_ticket,
        maintenance::create_ticket,
        maintenance::update_ticket,
        maintenance::delete_ticket,
        maintenance::update_status,
        maintenance::add_comment,
        maintenance::bulk_update_status,
        maintenance::asset_history,
        maintenance::export_tickets,
        // Hardware models
        hardware_models::list_models,
        hardware_models::get_model,
        hardware_models::create_model,
        hardware_models::update_model,
        hardware_models::delete_model,
        hardware_models::import_models,
        hardware_models::export_models,
        // Invoices
        invoices::list_invoices,
        invoices::get_invoice,
        invoices::create_invoice,
        invoices::update_invoice,
        invoices::delete_invoice,
        invoices::export_invoices,
        // Deployment
        deployment::assign,
        deployment::unassign,
        deployment::onboard,
        deployment::offboard,
        // Dashboard
        dashboard::dashboard_stats,
    ),
    components(
        schemas(
            // Pages
            AssetPage,
            EmployeePage,
            MaintenancePage,
            ModelPage,
            InvoicePage,
            PaginationMeta,
            // Assets
            crate::models::Asset,
            crate::models::CreateAsset,
            crate::models::UpdateAsset,
            crate::models::AssetState,
            crate::models::InventoryStats,
            crate::models::WarrantyInfo,
            crate::models::enums::WarrantyStatus,
            crate::models::BulkStateRequest,
            crate::models::BulkDeleteRequest,
            crate::models::BulkResult,
            crate::models::ImportResult,
            crate::models::RowError,
            // Employees
            crate::models::Employee,
            crate::models::CreateEmployee,
            crate::models::UpdateEmployee,
            // Maintenance
            crate::models::MaintenanceRecord,
            crate::models::CreateMaintenance,
            crate::models::UpdateMaintenance,
            crate::models::MaintenanceStatus,
            crate::models::MaintenancePriority,
            crate::models::MaintenanceCategory,
            crate::models::TimelineEventKind,
            crate::models::TimelineEvent,
            crate::models::Comment,
            crate::models::MaintenanceCost,
            crate::models::StatusUpdateRequest,
            crate::models::AddCommentRequest,
            crate::models::BulkStatusRequest,
            // Hardware models
            crate::models::HardwareModel,
            crate::models::CreateHardwareModel,
            crate::models::UpdateHardwareModel,
            // Invoices
            crate::models::Invoice,
            crate::models::InvoiceLineItem,
            crate::models::LineItemInput,
            crate::models::CreateInvoice,
            crate::models::UpdateInvoice,
            // Deployment
            crate::models::AssignAssetRequest,
            crate::models::UnassignAssetRequest,
            crate::models::OnboardRequest,
            crate::models::OffboardRequest,
            crate::models::DeploymentReport,
            crate::models::ItemFailure,
            // Dashboard
            crate::models::DashboardStats,
            crate::models::stats::TotalAssets,
            crate::models::stats::DeploymentStats,
            crate::models::stats::StockStats,
            crate::models::stats::MaintenanceStats,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
            crate::error::ErrorDetail,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "assets", description = "Asset inventory"),
        (name = "employees", description = "Employee directory"),
        (name = "maintenance", description = "Maintenance tickets"),
        (name = "models", description = "Hardware model catalogue"),
        (name = "invoices", description = "Purchase invoices"),
        (name = "deployment", description = "Assigning equipment to employees"),
        (name = "dashboard", description = "Dashboard statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
