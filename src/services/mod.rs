//! Business logic services

pub mod dashboard;
pub mod deployment;
pub mod employees;
pub mod hardware_models;
pub mod inventory;
pub mod invoices;
pub mod maintenance;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub inventory: inventory::InventoryService,
    pub employees: employees::EmployeesService,
    pub maintenance: maintenance::MaintenanceService,
    pub hardware_models: hardware_models::HardwareModelsService,
    pub invoices: invoices::InvoicesService,
    pub deployment: deployment::DeploymentService,
    pub dashboard: dashboard::DashboardService,
    repository: Repository,
}

impl Services {
    /// Create all services over the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            inventory: inventory::InventoryService::new(repository.clone()),
            employees: employees::EmployeesService::new(repository.clone()),
            maintenance: maintenance::MaintenanceService::new(repository.clone()),
            hardware_models: hardware_models::HardwareModelsService::new(repository.clone()),
            invoices: invoices::InvoicesService::new(repository.clone()),
            deployment: deployment::DeploymentService::new(repository.clone()),
            dashboard: dashboard::DashboardService::new(repository.clone()),
            repository,
        }
    }

    /// Name of the data source behind every service
    pub fn source_name(&self) -> &'static str {
        self.repository.name()
    }
}
