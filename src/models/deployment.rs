//! Deployment (assign / onboard / offboard) and bulk operation payloads

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::enums::AssetState;

/// Hand an asset to an employee (reassignment allowed)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignAssetRequest {
    pub asset_id: i64,
    /// Employee id or exact full name
    pub employee_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Return an asset to stock
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnassignAssetRequest {
    pub asset_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Equip a new employee with several assets at once
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OnboardRequest {
    pub employee_id: String,
    pub asset_ids: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Collect every asset held by a leaving employee
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OffboardRequest {
    pub employee_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Per-item failure of a multi-record operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ItemFailure {
    pub id: String,
    pub message: String,
}

impl ItemFailure {
    pub fn new(id: impl ToString, message: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            message: message.into(),
        }
    }
}

/// Outcome of onboarding / offboarding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeploymentReport {
    pub processed: Vec<i64>,
    pub failed: Vec<ItemFailure>,
}

/// Outcome of a bulk update or delete
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BulkResult {
    pub succeeded: usize,
    pub failed: Vec<ItemFailure>,
}

impl BulkResult {
    pub fn record(&mut self, id: impl ToString, outcome: Result<(), String>) {
        match outcome {
            Ok(()) => self.succeeded += 1,
            Err(message) => self.failed.push(ItemFailure::new(id, message)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkStateRequest {
    pub ids: Vec<i64>,
    pub state: AssetState,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkDeleteRequest {
    pub ids: Vec<i64>,
}
