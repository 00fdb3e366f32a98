//! Inventory and dashboard aggregates

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Inventory breakdown
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    pub total_assets: usize,
    pub assigned: usize,
    /// Every asset nobody holds, whatever its state
    pub in_stock: usize,
    pub by_category: IndexMap<String, usize>,
    pub by_state: IndexMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TotalAssets {
    pub count: usize,
    pub assigned: usize,
    pub in_stock: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeploymentStats {
    pub count: usize,
    /// Rounded share of assets currently assigned
    pub percentage: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StockStats {
    pub count: usize,
    /// Unassigned assets in NEW or GOOD condition
    pub ready: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceStats {
    /// Assets in FAIR or BROKEN condition
    pub count: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
}

/// Summary cards shown on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_assets: TotalAssets,
    pub deployment: DeploymentStats,
    pub stock: StockStats,
    pub maintenance: MaintenanceStats,
}

/// `round(part / total * 100)`, 0 for an empty inventory
pub fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}
