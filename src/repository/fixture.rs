//! Fixture-backed data source.
//!
//! Collections are loaded from the key-value store on first access, seeded from the
//! bundled fixture files when the store is empty, and written back after every
//! mutation. Deleting a record never touches the records referencing it.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};

use super::{filters, storage::KeyValueStore, DataSource};
use crate::{
    error::{AppError, AppResult},
    models::{
        legacy::{self, LegacyAsset, LegacyContext},
        paginate, Asset, AssetQuery, CreateAsset, CreateEmployee, CreateHardwareModel,
        CreateInvoice, CreateMaintenance, Employee, EmployeeQuery, HardwareModel, Invoice,
        InvoiceQuery, MaintenanceQuery, MaintenanceRecord, ModelQuery, PaginatedResponse,
        UpdateAsset, UpdateEmployee, UpdateHardwareModel, UpdateInvoice, UpdateMaintenance,
    },
};

pub const INVENTORY_KEY: &str = "it_inventory_data";
pub const EMPLOYEES_KEY: &str = "it_employee_data";
pub const MAINTENANCE_KEY: &str = "it_maintenance_data";
pub const MODELS_KEY: &str = "it_models_data";
pub const INVOICES_KEY: &str = "it_invoice_data";

#[derive(Deserialize)]
struct EmployeesFile {
    employees: Vec<Employee>,
}

#[derive(Deserialize)]
struct ModelFixture {
    name: String,
    make: String,
    category: String,
    #[serde(default)]
    specs: BTreeMap<String, String>,
}

/// Initial content of every collection
#[derive(Debug, Clone, Default)]
pub struct FixtureSeed {
    pub assets: Vec<Asset>,
    pub employees: Vec<Employee>,
    pub maintenance: Vec<MaintenanceRecord>,
    pub models: Vec<HardwareModel>,
    pub invoices: Vec<Invoice>,
}

impl FixtureSeed {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fixtures compiled into the binary; legacy inventory rows are converted to the
    /// canonical schema here.
    pub fn bundled() -> AppResult<Self> {
        let employees = serde_json::from_str::<EmployeesFile>(include_str!("../../fixtures/employees.json"))?.employees;

        let models: Vec<HardwareModel> =
            serde_json::from_str::<Vec<ModelFixture>>(include_str!("../../fixtures/models.json"))?
                .into_iter()
                .enumerate()
                .map(|(i, m)| HardwareModel {
                    id: i as i64 + 1,
                    name: m.name,
                    make: m.make,
                    category: m.category,
                    specs: m.specs,
                })
                .collect();

        let rows: Vec<LegacyAsset> = serde_json::from_str(include_str!("../../fixtures/inventory.json"))?;
        let assets = legacy::convert_all(rows, &LegacyContext::new(&employees, &models));

        let maintenance = serde_json::from_str(include_str!("../../fixtures/maintenance.json"))?;
        let invoices = serde_json::from_str(include_str!("../../fixtures/invoices.json"))?;

        Ok(Self {
            assets,
            employees,
            maintenance,
            models,
            invoices,
        })
    }
}

#[derive(Default)]
struct Collections {
    assets: Vec<Asset>,
    employees: Vec<Employee>,
    maintenance: Vec<MaintenanceRecord>,
    models: Vec<HardwareModel>,
    invoices: Vec<Invoice>,
}

impl From<FixtureSeed> for Collections {
    fn from(seed: FixtureSeed) -> Self {
        Self {
            assets: seed.assets,
            employees: seed.employees,
            maintenance: seed.maintenance,
            models: seed.models,
            invoices: seed.invoices,
        }
    }
}

/// Next `PREFIX-nnn` identifier after the highest numeric suffix in use
fn next_code<'a>(prefix: &str, ids: impl Iterator<Item = &'a str>) -> String {
    let max = ids
        .filter_map(|id| id.strip_prefix(prefix))
        .filter_map(|n| n.trim_start_matches('-').parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{}-{:03}", prefix, max + 1)
}

fn next_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().unwrap_or(0) + 1
}

fn not_found(kind: &str, id: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("{} with ID {} not found", kind, id))
}

/// Injected in-process data source over a [`KeyValueStore`]
pub struct FixtureSource {
    store: KeyValueStore,
    seed: FixtureSeed,
    data: Mutex<Option<Collections>>,
}

impl FixtureSource {
    pub fn new(store: KeyValueStore, seed: FixtureSeed) -> Self {
        Self {
            store,
            seed,
            data: Mutex::new(None),
        }
    }

    /// Volatile source over the bundled fixtures
    pub fn in_memory() -> AppResult<Self> {
        Ok(Self::new(KeyValueStore::in_memory(), FixtureSeed::bundled()?))
    }

    async fn lock(&self) -> AppResult<MappedMutexGuard<'_, Collections>> {
        let mut guard = self.data.lock().await;
        if guard.is_none() {
            let loaded = Collections {
                assets: self.store.initialize(INVENTORY_KEY, self.seed.assets.clone()).await?,
                employees: self.store.initialize(EMPLOYEES_KEY, self.seed.employees.clone()).await?,
                maintenance: self.store.initialize(MAINTENANCE_KEY, self.seed.maintenance.clone()).await?,
                models: self.store.initialize(MODELS_KEY, self.seed.models.clone()).await?,
                invoices: self.store.initialize(INVOICES_KEY, self.seed.invoices.clone()).await?,
            };
            tracing::debug!(
                "Fixture data loaded: {} assets, {} employees, {} tickets",
                loaded.assets.len(),
                loaded.employees.len(),
                loaded.maintenance.len()
            );
            *guard = Some(loaded);
        }
        Ok(MutexGuard::map(guard, |data| data.get_or_insert_with(Collections::default)))
    }

    /// Persist `next` under `key`, then make it the live collection.
    ///
    /// A failed write leaves the live collection untouched.
    async fn commit<T: Serialize>(&self, key: &str, live: &mut Vec<T>, next: Vec<T>) -> AppResult<()> {
        self.store.save(key, &next).await?;
        *live = next;
        Ok(())
    }

    /// Restore the seeded state, discarding every change
    pub async fn reset(&self) -> AppResult<()> {
        let mut guard = self.data.lock().await;
        let fresh = Collections::from(self.seed.clone());
        self.store.save(INVENTORY_KEY, &fresh.assets).await?;
        self.store.save(EMPLOYEES_KEY, &fresh.employees).await?;
        self.store.save(MAINTENANCE_KEY, &fresh.maintenance).await?;
        self.store.save(MODELS_KEY, &fresh.models).await?;
        self.store.save(INVOICES_KEY, &fresh.invoices).await?;
        *guard = Some(fresh);
        tracing::info!("Fixture data reset");
        Ok(())
    }
}

#[async_trait]
impl DataSource for FixtureSource {
    fn name(&self) -> &'static str {
        "fixture"
    }

    // -----------------------------------------------------------------------
    // Assets
    // -----------------------------------------------------------------------

    async fn assets_list(&self, query: &AssetQuery) -> AppResult<PaginatedResponse<Asset>> {
        let data = self.lock().await?;
        let mut rows = filters::filter_assets(&data.assets, &data.employees, query);
        rows.sort_by_key(|a| a.id);
        Ok(paginate(rows, query.page, query.page_size))
    }

    async fn assets_get(&self, id: i64) -> AppResult<Asset> {
        let data = self.lock().await?;
        data.assets
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| not_found("Asset", id))
    }

    async fn assets_create(&self, input: CreateAsset) -> AppResult<Asset> {
        let mut data = self.lock().await?;
        let id = next_id(data.assets.iter().map(|a| a.id));
        let asset = input.into_asset(id, Utc::now());
        let mut next = data.assets.clone();
        next.push(asset.clone());
        self.commit(INVENTORY_KEY, &mut data.assets, next).await?;
        Ok(asset)
    }

    async fn assets_update(&self, id: i64, input: UpdateAsset) -> AppResult<Asset> {
        let mut data = self.lock().await?;
        let mut next = data.assets.clone();
        let asset = next
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| not_found("Asset", id))?;
        input.apply(asset, Utc::now());
        let updated = asset.clone();
        self.commit(INVENTORY_KEY, &mut data.assets, next).await?;
        Ok(updated)
    }

    async fn assets_delete(&self, id: i64) -> AppResult<()> {
        let mut data = self.lock().await?;
        let mut next = data.assets.clone();
        next.retain(|a| a.id != id);
        if next.len() == data.assets.len() {
            return Err(not_found("Asset", id));
        }
        self.commit(INVENTORY_KEY, &mut data.assets, next).await
    }

    // -----------------------------------------------------------------------
    // Employees
    // -----------------------------------------------------------------------

    async fn employees_list(&self, query: &EmployeeQuery) -> AppResult<PaginatedResponse<Employee>> {
        let data = self.lock().await?;
        let mut rows = filters::filter_employees(&data.employees, query);
        rows.sort_by(|a, b| a.full_name.to_lowercase().cmp(&b.full_name.to_lowercase()));
        Ok(paginate(rows, query.page, query.page_size))
    }

    async fn employees_get(&self, id: &str) -> AppResult<Employee> {
        let data = self.lock().await?;
        data.employees
            .iter()
            .find(|e| e.id.eq_ignore_ascii_case(id))
            .cloned()
            .ok_or_else(|| not_found("Employee", id))
    }

    async fn employees_create(&self, input: CreateEmployee) -> AppResult<Employee> {
        let mut data = self.lock().await?;
        let id = next_code("EMP", data.employees.iter().map(|e| e.id.as_str()));
        let employee = input.into_employee(id);
        let mut next = data.employees.clone();
        next.push(employee.clone());
        self.commit(EMPLOYEES_KEY, &mut data.employees, next).await?;
        Ok(employee)
    }

    async fn employees_update(&self, id: &str, input: UpdateEmployee) -> AppResult<Employee> {
        let mut data = self.lock().await?;
        let mut next = data.employees.clone();
        let employee = next
            .iter_mut()
            .find(|e| e.id.eq_ignore_ascii_case(id))
            .ok_or_else(|| not_found("Employee", id))?;
        input.apply(employee);
        let updated = employee.clone();
        self.commit(EMPLOYEES_KEY, &mut data.employees, next).await?;
        Ok(updated)
    }

    async fn employees_delete(&self, id: &str) -> AppResult<()> {
        let mut data = self.lock().await?;
        let mut next = data.employees.clone();
        next.retain(|e| !e.id.eq_ignore_ascii_case(id));
        if next.len() == data.employees.len() {
            return Err(not_found("Employee", id));
        }
        self.commit(EMPLOYEES_KEY, &mut data.employees, next).await
    }

    // -----------------------------------------------------------------------
    // Maintenance
    // -----------------------------------------------------------------------

    async fn maintenance_list(&self, query: &MaintenanceQuery) -> AppResult<PaginatedResponse<MaintenanceRecord>> {
        let data = self.lock().await?;
        let mut rows = filters::filter_maintenance(&data.maintenance, query);
        rows.sort_by(|a, b| b.reported_date.cmp(&a.reported_date).then_with(|| b.id.cmp(&a.id)));
        Ok(paginate(rows, query.page, query.page_size))
    }

    async fn maintenance_get(&self, id: &str) -> AppResult<MaintenanceRecord> {
        let data = self.lock().await?;
        data.maintenance
            .iter()
            .find(|r| r.id.eq_ignore_ascii_case(id))
            .cloned()
            .ok_or_else(|| not_found("Maintenance record", id))
    }

    async fn maintenance_create(&self, input: CreateMaintenance) -> AppResult<MaintenanceRecord> {
        let mut data = self.lock().await?;
        let id = next_code("MNT", data.maintenance.iter().map(|r| r.id.as_str()));
        let record = input.into_record(id, Utc::now());
        let mut next = data.maintenance.clone();
        next.push(record.clone());
        self.commit(MAINTENANCE_KEY, &mut data.maintenance, next).await?;
        Ok(record)
    }

    async fn maintenance_update(&self, id: &str, input: UpdateMaintenance) -> AppResult<MaintenanceRecord> {
        let mut data = self.lock().await?;
        let mut next = data.maintenance.clone();
        let record = next
            .iter_mut()
            .find(|r| r.id.eq_ignore_ascii_case(id))
            .ok_or_else(|| not_found("Maintenance record", id))?;
        input.apply(record);
        let updated = record.clone();
        self.commit(MAINTENANCE_KEY, &mut data.maintenance, next).await?;
        Ok(updated)
    }

    async fn maintenance_delete(&self, id: &str) -> AppResult<()> {
        let mut data = self.lock().await?;
        let mut next = data.maintenance.clone();
        next.retain(|r| !r.id.eq_ignore_ascii_case(id));
        if next.len() == data.maintenance.len() {
            return Err(not_found("Maintenance record", id));
        }
        self.commit(MAINTENANCE_KEY, &mut data.maintenance, next).await
    }

    // -----------------------------------------------------------------------
    // Hardware models
    // -----------------------------------------------------------------------

    async fn models_list(&self, query: &ModelQuery) -> AppResult<PaginatedResponse<HardwareModel>> {
        let data = self.lock().await?;
        let mut rows = filters::filter_models(&data.models, query);
        rows.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(paginate(rows, query.page, query.page_size))
    }

    async fn models_get(&self, id: i64) -> AppResult<HardwareModel> {
        let data = self.lock().await?;
        data.models
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| not_found("Model", id))
    }

    async fn models_create(&self, input: CreateHardwareModel) -> AppResult<HardwareModel> {
        let mut data = self.lock().await?;
        let id = next_id(data.models.iter().map(|m| m.id));
        let model = input.into_model(id);
        let mut next = data.models.clone();
        next.push(model.clone());
        self.commit(MODELS_KEY, &mut data.models, next).await?;
        Ok(model)
    }

    async fn models_update(&self, id: i64, input: UpdateHardwareModel) -> AppResult<HardwareModel> {
        let mut data = self.lock().await?;
        let mut next = data.models.clone();
        let model = next
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| not_found("Model", id))?;
        input.apply(model);
        let updated = model.clone();
        self.commit(MODELS_KEY, &mut data.models, next).await?;
        Ok(updated)
    }

    async fn models_delete(&self, id: i64) -> AppResult<()> {
        let mut data = self.lock().await?;
        let mut next = data.models.clone();
        next.retain(|m| m.id != id);
        if next.len() == data.models.len() {
            return Err(not_found("Model", id));
        }
        self.commit(MODELS_KEY, &mut data.models, next).await
    }

    // -----------------------------------------------------------------------
    // Invoices
    // -----------------------------------------------------------------------

    async fn invoices_list(&self, query: &InvoiceQuery) -> AppResult<PaginatedResponse<Invoice>> {
        let data = self.lock().await?;
        let mut rows = filters::filter_invoices(&data.invoices, query);
        rows.sort_by(|a, b| b.purchase_date.cmp(&a.purchase_date));
        Ok(paginate(rows, query.page, query.page_size))
    }

    async fn invoices_get(&self, id: i64) -> AppResult<Invoice> {
        let data = self.lock().await?;
        data.invoices
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or_else(|| not_found("Invoice", id))
    }

    async fn invoices_create(&self, input: CreateInvoice) -> AppResult<Invoice> {
        let mut data = self.lock().await?;
        let id = next_id(data.invoices.iter().map(|i| i.id));
        let invoice = input.into_invoice(id);
        let mut next = data.invoices.clone();
        next.push(invoice.clone());
        self.commit(INVOICES_KEY, &mut data.invoices, next).await?;
        Ok(invoice)
    }

    async fn invoices_update(&self, id: i64, input: UpdateInvoice) -> AppResult<Invoice> {
        let mut data = self.lock().await?;
        let mut next = data.invoices.clone();
        let invoice = next
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| not_found("Invoice", id))?;
        input.apply(invoice);
        let updated = invoice.clone();
        self.commit(INVOICES_KEY, &mut data.invoices, next).await?;
        Ok(updated)
    }

    async fn invoices_delete(&self, id: i64) -> AppResult<()> {
        let mut data = self.lock().await?;
        let mut next = data.invoices.clone();
        next.retain(|i| i.id != id);
        if next.len() == data.invoices.len() {
            return Err(not_found("Invoice", id));
        }
        self.commit(INVOICES_KEY, &mut data.invoices, next).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssetState, Assignment};

    fn source() -> FixtureSource {
        FixtureSource::in_memory().unwrap()
    }

    #[test]
    fn test_next_code() {
        let ids = ["EMP-001", "EMP-009", "legacy"];
        assert_eq!(next_code("EMP", ids.iter().copied()), "EMP-010");
        assert_eq!(next_code("MNT", std::iter::empty()), "MNT-001");
    }

    #[test]
    fn test_bundled_fixtures_parse() {
        let seed = FixtureSeed::bundled().unwrap();
        assert!(!seed.assets.is_empty());
        assert!(!seed.employees.is_empty());
        assert!(!seed.models.is_empty());
        assert!(!seed.maintenance.is_empty());
        assert!(!seed.invoices.is_empty());
        // fixture employees are stored by name and resolved to ids
        assert!(seed
            .assets
            .iter()
            .filter_map(|a| a.employee.reference())
            .all(|r| r.starts_with("EMP-")));
    }

    #[tokio::test]
    async fn test_list_paginates() {
        let source = source();
        let page = source
            .assets_list(&AssetQuery {
                page: Some(1),
                page_size: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.data.len(), 2);
        assert!(page.pagination.total_items >= 2);
    }

    #[tokio::test]
    async fn test_create_update_delete_asset() {
        let source = source();
        let before = source.assets_list(&AssetQuery::default()).await.unwrap().pagination.total_items;

        let created = source
            .assets_create(CreateAsset {
                category: "Monitor".into(),
                make: "LG".into(),
                model: "27UL500".into(),
                model_id: None,
                service_tag: "LG-0001".into(),
                state: Some(AssetState::New),
                employee: None,
                location: None,
                notes: None,
                warranty_expiry: None,
                specs: Default::default(),
                invoice_line_item_id: None,
            })
            .await
            .unwrap();
        assert_eq!(created.employee, Assignment::Unassigned);
        assert_eq!(
            source.assets_list(&AssetQuery::default()).await.unwrap().pagination.total_items,
            before + 1
        );

        let updated = source
            .assets_update(created.id, UpdateAsset::assign(Assignment::employee("EMP-001")))
            .await
            .unwrap();
        assert_eq!(updated.employee.reference(), Some("EMP-001"));

        source.assets_delete(created.id).await.unwrap();
        let err = source.assets_get(created.id).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(source.assets_delete(created.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_employee_delete_does_not_cascade() {
        let source = source();
        let holder = source
            .assets_list(&AssetQuery::default())
            .await
            .unwrap()
            .data
            .into_iter()
            .find(|a| a.is_assigned())
            .unwrap();
        let employee_id = holder.employee.reference().unwrap().to_string();

        source.employees_delete(&employee_id).await.unwrap();
        let still = source.assets_get(holder.id).await.unwrap();
        assert_eq!(still.employee.reference(), Some(employee_id.as_str()));
    }

    #[tokio::test]
    async fn test_reset_restores_seed() {
        let source = source();
        let first = source.employees_list(&EmployeeQuery::default()).await.unwrap().data[0].clone();
        source.employees_delete(&first.id).await.unwrap();
        source.reset().await.unwrap();
        assert_eq!(source.employees_get(&first.id).await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_data_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyValueStore::open_dir(dir.path().join("store")).await.unwrap();
        let source = FixtureSource::new(store, FixtureSeed::bundled().unwrap());
        let before = source.assets_list(&AssetQuery::default()).await.unwrap();
        let first = before.data[0].clone();

        std::fs::remove_dir_all(dir.path().join("store")).unwrap();

        let created = source
            .assets_create(CreateAsset {
                category: "Monitor".into(),
                make: "LG".into(),
                model: "27UL500".into(),
                model_id: None,
                service_tag: "LG-0002".into(),
                state: None,
                employee: None,
                location: None,
                notes: None,
                warranty_expiry: None,
                specs: Default::default(),
                invoice_line_item_id: None,
            })
            .await;
        assert!(created.is_err());
        assert!(source
            .assets_update(first.id, UpdateAsset::assign(Assignment::employee("EMP-002")))
            .await
            .is_err());
        assert!(source.assets_delete(first.id).await.is_err());
        assert!(source.employees_delete("EMP-001").await.is_err());

        let after = source.assets_list(&AssetQuery::default()).await.unwrap();
        assert_eq!(after.pagination.total_items, before.pagination.total_items);
        assert_eq!(source.assets_get(first.id).await.unwrap(), first);
        assert!(source.employees_get("EMP-001").await.is_ok());
    }

    #[tokio::test]
    async fn test_changes_persist_in_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyValueStore::open_dir(dir.path()).await.unwrap();
        let source = FixtureSource::new(store, FixtureSeed::bundled().unwrap());
        let created = source
            .employees_create(CreateEmployee {
                full_name: "Zoë Martin".into(),
                email: "zoe.martin@example.com".into(),
                department: "Sales".into(),
                position: "Account Manager".into(),
                is_active: None,
            })
            .await
            .unwrap();

        let reopened = FixtureSource::new(
            KeyValueStore::open_dir(dir.path()).await.unwrap(),
            FixtureSeed::empty(),
        );
        let found = reopened.employees_get(&created.id).await.unwrap();
        assert_eq!(found.full_name, "Zoë Martin");
    }
}
