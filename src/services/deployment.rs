//! Deployment service: hand assets out and take them back

use super::employees::EmployeesService;
use crate::{
    error::{AppError, AppResult},
    models::{
        fetch_all, Asset, AssetQuery, AssignAssetRequest, Assignment, DeploymentReport, Employee,
        ItemFailure, OffboardRequest, OnboardRequest, UnassignAssetRequest, UpdateAsset,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct DeploymentService {
    repository: Repository,
    employees: EmployeesService,
}

impl DeploymentService {
    pub fn new(repository: Repository) -> Self {
        Self {
            employees: EmployeesService::new(repository.clone()),
            repository,
        }
    }

    /// Active employee behind an id or exact full name
    async fn recipient(&self, reference: &str) -> AppResult<Employee> {
        let employee = self.employees.resolve(reference).await?;
        if !employee.is_active {
            return Err(AppError::BusinessRule(format!(
                "Employee {} is inactive",
                employee.full_name
            )));
        }
        Ok(employee)
    }

    async fn hand_over(&self, asset_id: i64, employee: &Employee) -> AppResult<Asset> {
        self.repository
            .assets_update(asset_id, UpdateAsset::assign(Assignment::Employee(employee.id.clone())))
            .await
    }

    /// Assign an asset; an asset held by someone else is reassigned.
    pub async fn assign(&self, request: AssignAssetRequest) -> AppResult<Asset> {
        let employee = self.recipient(&request.employee_id).await?;
        let current = self.repository.assets_get(request.asset_id).await?;
        let asset = self.hand_over(current.id, &employee).await?;
        tracing::info!(
            asset = asset.id,
            from = %current.employee,
            to = %employee.id,
            notes = request.notes.as_deref().unwrap_or(""),
            "asset assigned"
        );
        Ok(asset)
    }

    /// Return an asset to stock; already unassigned assets are left as they are.
    pub async fn unassign(&self, request: UnassignAssetRequest) -> AppResult<Asset> {
        let current = self.repository.assets_get(request.asset_id).await?;
        if !current.is_assigned() {
            return Ok(current);
        }
        let asset = self
            .repository
            .assets_update(current.id, UpdateAsset::assign(Assignment::Unassigned))
            .await?;
        tracing::info!(
            asset = asset.id,
            from = %current.employee,
            notes = request.notes.as_deref().unwrap_or(""),
            "asset returned to stock"
        );
        Ok(asset)
    }

    /// Give a set of in-stock assets to one employee. Assets already held by
    /// someone else are reported, not taken.
    pub async fn onboard(&self, request: OnboardRequest) -> AppResult<DeploymentReport> {
        let employee = self.recipient(&request.employee_id).await?;
        let mut report = DeploymentReport::default();

        for &asset_id in &request.asset_ids {
            let outcome = match self.repository.assets_get(asset_id).await {
                Ok(asset) => match asset.employee.reference() {
                    Some(holder) if holder != employee.id => {
                        Err(format!("Asset {} is already assigned to {}", asset.service_tag, holder))
                    }
                    _ => self.hand_over(asset_id, &employee).await.map(|_| ()).map_err(|e| e.user_message()),
                },
                Err(e) => Err(e.user_message()),
            };
            match outcome {
                Ok(()) => report.processed.push(asset_id),
                Err(message) => report.failed.push(ItemFailure::new(asset_id, message)),
            }
        }

        tracing::info!(
            employee = %employee.id,
            processed = report.processed.len(),
            failed = report.failed.len(),
            "onboarding done"
        );
        Ok(report)
    }

    /// Take back every asset the employee holds.
    pub async fn offboard(&self, request: OffboardRequest) -> AppResult<DeploymentReport> {
        let employee = self.employees.resolve(&request.employee_id).await?;
        let query = AssetQuery {
            employee: Some(employee.id.clone()),
            ..Default::default()
        };
        let held: Vec<Asset> = fetch_all(|page| {
            let query = query.at_page(page);
            async move { self.repository.assets_list(&query).await }
        })
        .await?
        .into_iter()
        .filter(|a| a.employee.reference() == Some(employee.id.as_str()))
        .collect();

        let mut report = DeploymentReport::default();
        for asset in held {
            match self
                .repository
                .assets_update(asset.id, UpdateAsset::assign(Assignment::Unassigned))
                .await
            {
                Ok(_) => report.processed.push(asset.id),
                Err(e) => report.failed.push(ItemFailure::new(asset.id, e.user_message())),
            }
        }

        tracing::info!(
            employee = %employee.id,
            returned = report.processed.len(),
            notes = request.notes.as_deref().unwrap_or(""),
            "offboarding done"
        );
        Ok(report)
    }
}
