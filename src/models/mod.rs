//! Data models for Assetdesk

pub mod asset;
pub mod deployment;
pub mod employee;
pub mod enums;
pub mod hardware_model;
pub mod import_report;
pub mod invoice;
pub mod legacy;
pub mod maintenance;
pub mod pagination;
pub mod stats;

// Re-export commonly used types
pub use asset::{Asset, AssetQuery, CreateAsset, UpdateAsset};
pub use deployment::{
    AssignAssetRequest, BulkDeleteRequest, BulkResult, BulkStateRequest, DeploymentReport,
    ItemFailure, OffboardRequest, OnboardRequest, UnassignAssetRequest,
};
pub use employee::{CreateEmployee, Employee, EmployeeQuery, UpdateEmployee};
pub use enums::{
    AssetState, Assignment, MaintenanceCategory, MaintenancePriority, MaintenanceStatus,
    TimelineEventKind, WarrantyStatus, UNASSIGNED,
};
pub use hardware_model::{CreateHardwareModel, HardwareModel, ModelQuery, UpdateHardwareModel};
pub use import_report::{ImportResult, RowError};
pub use invoice::{CreateInvoice, Invoice, InvoiceLineItem, InvoiceQuery, LineItemInput, UpdateInvoice};
pub use maintenance::{
    AddCommentRequest, BulkStatusRequest, Comment, CreateMaintenance, MaintenanceCost,
    MaintenanceQuery, MaintenanceRecord, StatusUpdateRequest, TimelineEvent, UpdateMaintenance,
    WarrantyInfo,
};
pub use pagination::{fetch_all, paginate, PaginatedResponse, PaginationMeta};
pub use stats::{DashboardStats, InventoryStats};
