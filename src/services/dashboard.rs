//! Dashboard summary cards

use crate::{
    error::AppResult,
    models::{
        stats::{
            percentage, DeploymentStats, MaintenanceStats, StockStats, TotalAssets,
        },
        fetch_all, Asset, AssetQuery, DashboardStats, MaintenanceQuery, MaintenanceRecord, MaintenanceStatus,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct DashboardService {
    repository: Repository,
}

impl DashboardService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn stats(&self) -> AppResult<DashboardStats> {
        let assets = fetch_all(|page| {
            let query = AssetQuery::default().at_page(page);
            async move { self.repository.assets_list(&query).await }
        })
        .await?;
        let tickets = fetch_all(|page| {
            let query = MaintenanceQuery::default().at_page(page);
            async move { self.repository.maintenance_list(&query).await }
        })
        .await?;
        Ok(dashboard_stats(&assets, &tickets))
    }
}

pub fn dashboard_stats(assets: &[Asset], tickets: &[MaintenanceRecord]) -> DashboardStats {
    let total = assets.len();
    let assigned = assets.iter().filter(|a| a.is_assigned()).count();
    let in_stock = total - assigned;
    let ready = assets
        .iter()
        .filter(|a| !a.is_assigned() && a.state.is_deployable())
        .count();
    let with_status = |status: MaintenanceStatus| tickets.iter().filter(|t| t.status == status).count();

    DashboardStats {
        total_assets: TotalAssets {
            count: total,
            assigned,
            in_stock,
        },
        deployment: DeploymentStats {
            count: assigned,
            percentage: percentage(assigned, total),
        },
        stock: StockStats {
            count: in_stock,
            ready,
        },
        maintenance: MaintenanceStats {
            count: assets.iter().filter(|a| a.state.needs_attention()).count(),
            pending: with_status(MaintenanceStatus::Pending),
            in_progress: with_status(MaintenanceStatus::InProgress),
            completed: with_status(MaintenanceStatus::Completed),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixture::FixtureSource;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_stats_over_bundled_fixtures() {
        let source = FixtureSource::in_memory().unwrap();
        let service = DashboardService::new(Repository::new(Arc::new(source)));
        let stats = service.stats().await.unwrap();

        assert_eq!(stats.total_assets.count, 12);
        assert_eq!(stats.total_assets.assigned, 8);
        assert_eq!(stats.total_assets.in_stock, 4);
        assert_eq!(stats.deployment.percentage, 67);
        assert_eq!(stats.stock.ready, 3);
        assert_eq!(stats.maintenance.count, 2);
        assert_eq!(stats.maintenance.pending, 1);
        assert_eq!(stats.maintenance.in_progress, 1);
        assert_eq!(stats.maintenance.completed, 1);
    }

    #[test]
    fn test_empty_inventory() {
        let stats = dashboard_stats(&[], &[]);
        assert_eq!(stats.deployment.percentage, 0);
        assert_eq!(stats.stock.ready, 0);
    }
}
