//! Repository layer: data sources behind the services
//!
//! [`DataSource`] is implemented by [`fixture::FixtureSource`] (bundled fixtures kept
//! in a key-value store) and [`http::HttpSource`] (remote REST backend). The
//! implementation is chosen once, when the [`Repository`] is built.

pub mod filters;
pub mod fixture;
pub mod http;
pub mod storage;

use async_trait::async_trait;
use std::ops::Deref;
use std::sync::Arc;

use crate::{
    config::{ApiConfig, DataConfig, DataMode},
    error::AppResult,
    models::{
        Asset, AssetQuery, CreateAsset, CreateEmployee, CreateHardwareModel, CreateInvoice,
        CreateMaintenance, Employee, EmployeeQuery, HardwareModel, Invoice, InvoiceQuery,
        MaintenanceQuery, MaintenanceRecord, ModelQuery, PaginatedResponse, UpdateAsset,
        UpdateEmployee, UpdateHardwareModel, UpdateInvoice, UpdateMaintenance,
    },
};

use fixture::{FixtureSeed, FixtureSource};
use http::HttpSource;
use storage::KeyValueStore;

/// CRUD and filtered listing for every entity
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Short name shown in logs and the readiness check
    fn name(&self) -> &'static str;

    async fn assets_list(&self, query: &AssetQuery) -> AppResult<PaginatedResponse<Asset>>;
    async fn assets_get(&self, id: i64) -> AppResult<Asset>;
    async fn assets_create(&self, data: CreateAsset) -> AppResult<Asset>;
    async fn assets_update(&self, id: i64, data: UpdateAsset) -> AppResult<Asset>;
    async fn assets_delete(&self, id: i64) -> AppResult<()>;

    async fn employees_list(&self, query: &EmployeeQuery) -> AppResult<PaginatedResponse<Employee>>;
    async fn employees_get(&self, id: &str) -> AppResult<Employee>;
    async fn employees_create(&self, data: CreateEmployee) -> AppResult<Employee>;
    async fn employees_update(&self, id: &str, data: UpdateEmployee) -> AppResult<Employee>;
    async fn employees_delete(&self, id: &str) -> AppResult<()>;

    async fn maintenance_list(&self, query: &MaintenanceQuery) -> AppResult<PaginatedResponse<MaintenanceRecord>>;
    async fn maintenance_get(&self, id: &str) -> AppResult<MaintenanceRecord>;
    async fn maintenance_create(&self, data: CreateMaintenance) -> AppResult<MaintenanceRecord>;
    async fn maintenance_update(&self, id: &str, data: UpdateMaintenance) -> AppResult<MaintenanceRecord>;
    async fn maintenance_delete(&self, id: &str) -> AppResult<()>;

    async fn models_list(&self, query: &ModelQuery) -> AppResult<PaginatedResponse<HardwareModel>>;
    async fn models_get(&self, id: i64) -> AppResult<HardwareModel>;
    async fn models_create(&self, data: CreateHardwareModel) -> AppResult<HardwareModel>;
    async fn models_update(&self, id: i64, data: UpdateHardwareModel) -> AppResult<HardwareModel>;
    async fn models_delete(&self, id: i64) -> AppResult<()>;

    async fn invoices_list(&self, query: &InvoiceQuery) -> AppResult<PaginatedResponse<Invoice>>;
    async fn invoices_get(&self, id: i64) -> AppResult<Invoice>;
    async fn invoices_create(&self, data: CreateInvoice) -> AppResult<Invoice>;
    async fn invoices_update(&self, id: i64, data: UpdateInvoice) -> AppResult<Invoice>;
    async fn invoices_delete(&self, id: i64) -> AppResult<()>;
}

/// Shared handle on the configured data source
#[derive(Clone)]
pub struct Repository {
    source: Arc<dyn DataSource>,
}

impl Repository {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self { source }
    }

    /// Build the data source selected by `data.mode`
    pub async fn from_config(data: &DataConfig, api: &ApiConfig) -> AppResult<Self> {
        let source: Arc<dyn DataSource> = match data.mode {
            DataMode::Fixture => {
                let store = match &data.storage_dir {
                    Some(dir) => KeyValueStore::open_dir(dir).await?,
                    None => KeyValueStore::in_memory(),
                };
                let seed = if data.seed_fixtures {
                    FixtureSeed::bundled()?
                } else {
                    FixtureSeed::empty()
                };
                Arc::new(FixtureSource::new(store, seed))
            }
            DataMode::Http => Arc::new(HttpSource::new(api)?),
        };

        tracing::info!("Data source: {}", source.name());
        Ok(Self { source })
    }
}

impl Deref for Repository {
    type Target = dyn DataSource;

    fn deref(&self) -> &Self::Target {
        self.source.as_ref()
    }
}
