//! Inventory service: asset CRUD, bulk operations, import/export and reports

use chrono::NaiveDate;
use indexmap::IndexMap;
use std::collections::HashSet;
use validator::Validate;

use super::employees::EmployeesService;
use crate::{
    error::{AppError, AppResult},
    export, import,
    models::{
        enums::WarrantyStatus, Asset, AssetQuery, AssetState, Assignment, BulkResult,
        CreateAsset, EmployeeQuery, fetch_all, ImportResult, InventoryStats, PaginatedResponse,
        UpdateAsset, WarrantyInfo,
    },
    repository::Repository,
};

/// Results returned by the quick search box
pub const SEARCH_LIMIT: usize = 10;

#[derive(Clone)]
pub struct InventoryService {
    repository: Repository,
    employees: EmployeesService,
}

impl InventoryService {
    pub fn new(repository: Repository) -> Self {
        Self {
            employees: EmployeesService::new(repository.clone()),
            repository,
        }
    }

    pub async fn list(&self, query: &AssetQuery) -> AppResult<PaginatedResponse<Asset>> {
        self.repository.assets_list(query).await
    }

    pub async fn all(&self, query: &AssetQuery) -> AppResult<Vec<Asset>> {
        fetch_all(|page| {
            let query = query.at_page(page);
            async move { self.repository.assets_list(&query).await }
        })
        .await
    }

    pub async fn get(&self, id: i64) -> AppResult<Asset> {
        self.repository.assets_get(id).await
    }

    /// Lookup by service tag, ignoring case
    pub async fn get_by_service_tag(&self, tag: &str) -> AppResult<Asset> {
        self.find_by_service_tag(tag)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset with service tag {} not found", tag)))
    }

    async fn find_by_service_tag(&self, tag: &str) -> AppResult<Option<Asset>> {
        let tag = tag.trim();
        Ok(self
            .all(&AssetQuery::search(tag))
            .await?
            .into_iter()
            .find(|a| a.service_tag.eq_ignore_ascii_case(tag)))
    }

    /// First matches for a free-text term
    pub async fn search(&self, term: &str) -> AppResult<Vec<Asset>> {
        if term.trim().is_empty() {
            return Ok(Vec::new());
        }
        let query = AssetQuery {
            page_size: Some(SEARCH_LIMIT),
            ..AssetQuery::search(term.trim())
        };
        Ok(self.repository.assets_list(&query).await?.data)
    }

    /// Turn an employee name into its id; unknown employees break the
    /// assignment invariant.
    async fn resolve_assignment(&self, assignment: Assignment) -> AppResult<Assignment> {
        let Some(reference) = assignment.reference() else {
            return Ok(Assignment::Unassigned);
        };
        match self.employees.resolve(reference).await {
            Ok(employee) => Ok(Assignment::Employee(employee.id)),
            Err(e) if e.is_not_found() => Err(AppError::BusinessRule(format!(
                "Cannot assign to unknown employee '{}'",
                reference
            ))),
            Err(e) => Err(e),
        }
    }

    pub async fn create(&self, mut data: CreateAsset) -> AppResult<Asset> {
        data.validate()?;
        data.service_tag = data.service_tag.trim().to_string();
        if self.find_by_service_tag(&data.service_tag).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Asset with service tag {} already exists",
                data.service_tag
            )));
        }
        if let Some(assignment) = data.employee.take() {
            data.employee = Some(self.resolve_assignment(assignment).await?);
        }

        let asset = self.repository.assets_create(data).await?;
        tracing::info!(id = asset.id, tag = %asset.service_tag, "asset created");
        Ok(asset)
    }

    pub async fn update(&self, id: i64, mut data: UpdateAsset) -> AppResult<Asset> {
        if let Some(tag) = data.service_tag.as_mut() {
            *tag = tag.trim().to_string();
            if tag.is_empty() {
                return Err(AppError::Validation("Service tag is required".to_string()));
            }
            if let Some(other) = self.find_by_service_tag(tag).await? {
                if other.id != id {
                    return Err(AppError::Conflict(format!(
                        "Asset with service tag {} already exists",
                        tag
                    )));
                }
            }
        }
        if let Some(assignment) = data.employee.take() {
            data.employee = Some(self.resolve_assignment(assignment).await?);
        }
        self.repository.assets_update(id, data).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository.assets_delete(id).await?;
        tracing::info!(id, "asset deleted");
        Ok(())
    }

    pub async fn bulk_update_state(&self, ids: &[i64], state: AssetState) -> AppResult<BulkResult> {
        let mut result = BulkResult::default();
        for &id in ids {
            let outcome = self.repository.assets_update(id, UpdateAsset::state(state)).await;
            result.record(id, outcome.map(|_| ()).map_err(|e| e.user_message()));
        }
        Ok(result)
    }

    pub async fn bulk_delete(&self, ids: &[i64]) -> AppResult<BulkResult> {
        let mut result = BulkResult::default();
        for &id in ids {
            let outcome = self.repository.assets_delete(id).await;
            result.record(id, outcome.map_err(|e| e.user_message()));
        }
        Ok(result)
    }

    /// Create one asset per valid CSV row
    ///
    /// Holders are resolved by id or full name; rows naming an unknown employee or
    /// reusing a service tag are reported and skipped.
    pub async fn import_csv(&self, text: &str) -> AppResult<ImportResult> {
        let parsed = import::parse_inventory_csv(text)?;
        let mut result = ImportResult::default();
        for rejected in parsed.rejected {
            result.record_failure(rejected.row, rejected.message);
        }

        let mut tags: HashSet<String> = self
            .all(&AssetQuery::default())
            .await?
            .into_iter()
            .map(|a| a.service_tag.to_lowercase())
            .collect();

        for (row, mut data) in parsed.records {
            if !tags.insert(data.service_tag.to_lowercase()) {
                result.record_failure(row, format!("Duplicate service tag {}", data.service_tag));
                continue;
            }
            if let Some(assignment) = data.employee.take() {
                match self.resolve_assignment(assignment).await {
                    Ok(resolved) => data.employee = Some(resolved),
                    Err(e) => {
                        result.record_failure(row, e.user_message());
                        continue;
                    }
                }
            }
            match self.repository.assets_create(data).await {
                Ok(_) => result.record_success(),
                Err(e) => result.record_failure(row, e.user_message()),
            }
        }

        let result = result.finish();
        tracing::info!(imported = result.imported, failed = result.failed, "inventory import done");
        Ok(result)
    }

    pub async fn export_csv(&self, query: &AssetQuery) -> AppResult<String> {
        let assets = self.all(query).await?;
        let employees = self.employees.all(&EmployeeQuery::default()).await?;
        export::assets_to_csv(&assets, &employees)
    }

    pub async fn stats(&self) -> AppResult<InventoryStats> {
        Ok(inventory_stats(&self.all(&AssetQuery::default()).await?))
    }

    /// Assets with a warranty date, soonest expiry first
    pub async fn warranty_report(&self, today: NaiveDate) -> AppResult<Vec<WarrantyInfo>> {
        let assets = self.all(&AssetQuery::default()).await?;
        let employees = self.employees.all(&EmployeeQuery::default()).await?;

        let mut report: Vec<WarrantyInfo> = assets
            .into_iter()
            .filter_map(|asset| {
                let expiry = asset.warranty_expiry?;
                let days = WarrantyInfo::days_between(today, expiry);
                let employee = match asset.employee.reference() {
                    None => "Unassigned".to_string(),
                    Some(r) => employees
                        .iter()
                        .find(|e| e.id == r)
                        .map_or_else(|| r.to_string(), |e| e.full_name.clone()),
                };
                Some(WarrantyInfo {
                    asset_tag: asset.service_tag,
                    asset_category: asset.category,
                    make: asset.make,
                    model: asset.model,
                    employee,
                    warranty_expiry: expiry,
                    days_until_expiry: days,
                    status: WarrantyStatus::from_days_left(days),
                })
            })
            .collect();
        report.sort_by_key(|w| w.days_until_expiry);
        Ok(report)
    }
}

/// Counts by holder, category (first-seen order) and state (fixed order)
pub fn inventory_stats(assets: &[Asset]) -> InventoryStats {
    let mut by_category: IndexMap<String, usize> = IndexMap::new();
    let mut by_state: IndexMap<String, usize> = AssetState::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();

    for asset in assets {
        *by_category.entry(asset.category.clone()).or_default() += 1;
        *by_state.entry(asset.state.as_str().to_string()).or_default() += 1;
    }

    let assigned = assets.iter().filter(|a| a.is_assigned()).count();
    InventoryStats {
        total_assets: assets.len(),
        assigned,
        in_stock: assets.len() - assigned,
        by_category,
        by_state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{paginate, Employee};
    use crate::repository::MockDataSource;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn asset(id: i64, tag: &str, state: AssetState, employee: Assignment) -> Asset {
        Asset {
            id,
            category: if id % 2 == 0 { "Monitor" } else { "Laptop" }.into(),
            make: "Dell".into(),
            model: "Latitude".into(),
            model_id: None,
            service_tag: tag.into(),
            state,
            employee,
            location: "Office".into(),
            notes: None,
            warranty_expiry: None,
            specs: BTreeMap::new(),
            invoice_line_item_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn jane() -> Employee {
        Employee {
            id: "EMP-007".into(),
            full_name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            department: "Finance".into(),
            position: "Analyst".into(),
            is_active: true,
        }
    }

    fn new_asset(tag: &str, employee: Option<Assignment>) -> CreateAsset {
        CreateAsset {
            category: "Laptop".into(),
            make: "Dell".into(),
            model: "Latitude 5440".into(),
            model_id: None,
            service_tag: tag.into(),
            state: None,
            employee,
            location: None,
            notes: None,
            warranty_expiry: None,
            specs: BTreeMap::new(),
            invoice_line_item_id: None,
        }
    }

    fn service(mock: MockDataSource) -> InventoryService {
        InventoryService::new(Repository::new(Arc::new(mock)))
    }

    #[tokio::test]
    async fn test_all_reads_every_page() {
        let mut mock = MockDataSource::new();
        mock.expect_assets_list().times(3).returning(|query| {
            let rows = (1..=1_200)
                .map(|id| asset(id, &format!("T{}", id), AssetState::Good, Assignment::Unassigned))
                .collect();
            Ok(paginate(rows, query.page, query.page_size))
        });

        let all = service(mock).all(&AssetQuery::default()).await.unwrap();
        assert_eq!(all.len(), 1_200);
        assert_eq!(all.last().map(|a| a.id), Some(1_200));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_tag_ignoring_case() {
        let mut mock = MockDataSource::new();
        mock.expect_assets_list().returning(|_| {
            Ok(paginate(vec![asset(1, "DL-100", AssetState::Good, Assignment::Unassigned)], None, None))
        });
        mock.expect_assets_create().never();

        let err = service(mock).create(new_asset(" dl-100 ", None)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_resolves_employee_name() {
        let mut mock = MockDataSource::new();
        mock.expect_assets_list().returning(|_| Ok(paginate(Vec::new(), None, None)));
        mock.expect_employees_get()
            .returning(|id| Err(AppError::NotFound(format!("Employee with ID {} not found", id))));
        mock.expect_employees_list()
            .returning(|_| Ok(paginate(vec![jane()], None, None)));
        mock.expect_assets_create()
            .withf(|data| data.employee == Some(Assignment::employee("EMP-007")))
            .returning(|data| Ok(data.into_asset(13, chrono::Utc::now())));

        let created = service(mock)
            .create(new_asset("NEW-1", Some(Assignment::employee("Jane Doe"))))
            .await
            .unwrap();
        assert_eq!(created.employee.reference(), Some("EMP-007"));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_employee() {
        let mut mock = MockDataSource::new();
        mock.expect_assets_list().returning(|_| Ok(paginate(Vec::new(), None, None)));
        mock.expect_employees_get()
            .returning(|id| Err(AppError::NotFound(format!("Employee with ID {} not found", id))));
        mock.expect_employees_list()
            .returning(|_| Ok(paginate(vec![jane()], None, None)));
        mock.expect_assets_create().never();

        let err = service(mock)
            .create(new_asset("NEW-2", Some(Assignment::employee("Nobody"))))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn test_bulk_state_collects_failures() {
        let mut mock = MockDataSource::new();
        mock.expect_assets_update().returning(|id, data| {
            if id == 2 {
                return Err(AppError::NotFound(format!("Asset with ID {} not found", id)));
            }
            let mut a = asset(id, "X", AssetState::Good, Assignment::Unassigned);
            data.apply(&mut a, chrono::Utc::now());
            Ok(a)
        });

        let result = service(mock)
            .bulk_update_state(&[1, 2, 3], AssetState::Broken)
            .await
            .unwrap();
        assert_eq!(result.succeeded, 2);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].id, "2");
        assert_eq!(result.failed[0].message, "Asset with ID 2 not found");
    }

    #[tokio::test]
    async fn test_search_is_capped_and_blank_is_empty() {
        let mut mock = MockDataSource::new();
        mock.expect_assets_list()
            .withf(|q| q.page_size == Some(SEARCH_LIMIT) && q.search.as_deref() == Some("dell"))
            .times(1)
            .returning(|_| Ok(paginate(Vec::new(), None, None)));

        let svc = service(mock);
        assert!(svc.search("  ").await.unwrap().is_empty());
        assert!(svc.search(" dell ").await.unwrap().is_empty());
    }

    #[test]
    fn test_inventory_stats() {
        let assets = vec![
            asset(1, "A", AssetState::Good, Assignment::employee("EMP-001")),
            asset(2, "B", AssetState::New, Assignment::Unassigned),
            asset(3, "C", AssetState::Broken, Assignment::Unassigned),
        ];
        let stats = inventory_stats(&assets);
        assert_eq!(stats.total_assets, 3);
        assert_eq!(stats.assigned, 1);
        assert_eq!(stats.in_stock, 2);
        assert_eq!(stats.by_category["Laptop"], 2);
        assert_eq!(stats.by_category["Monitor"], 1);
        assert_eq!(stats.by_state["FAIR"], 0);
        assert_eq!(stats.by_state.keys().next().map(String::as_str), Some("NEW"));
    }

    #[tokio::test]
    async fn test_warranty_report_orders_by_expiry() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let mut mock = MockDataSource::new();
        mock.expect_assets_list().returning(move |_| {
            let mut soon = asset(1, "SOON", AssetState::Good, Assignment::employee("EMP-007"));
            soon.warranty_expiry = NaiveDate::from_ymd_opt(2026, 1, 20);
            let mut gone = asset(2, "GONE", AssetState::Good, Assignment::Unassigned);
            gone.warranty_expiry = NaiveDate::from_ymd_opt(2025, 12, 1);
            let mut later = asset(3, "LATER", AssetState::Good, Assignment::Unassigned);
            later.warranty_expiry = NaiveDate::from_ymd_opt(2027, 6, 1);
            let none = asset(4, "NONE", AssetState::Good, Assignment::Unassigned);
            Ok(paginate(vec![later, soon, none, gone], None, None))
        });
        mock.expect_employees_list()
            .returning(|_| Ok(paginate(vec![jane()], None, None)));

        let report = service(mock).warranty_report(today).await.unwrap();
        let tags: Vec<&str> = report.iter().map(|w| w.asset_tag.as_str()).collect();
        assert_eq!(tags, vec!["GONE", "SOON", "LATER"]);
        assert_eq!(report[0].status, WarrantyStatus::Expired);
        assert_eq!(report[1].status, WarrantyStatus::ExpiringSoon);
        assert_eq!(report[1].employee, "Jane Doe");
        assert_eq!(report[2].status, WarrantyStatus::Active);
    }
}
