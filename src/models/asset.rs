//! Asset model (canonical schema)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{AssetState, Assignment};

/// A tracked piece of hardware
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: i64,
    pub category: String,
    pub make: String,
    pub model: String,
    #[serde(default)]
    pub model_id: Option<i64>,
    pub service_tag: String,
    pub state: AssetState,
    #[serde(default)]
    #[schema(value_type = String, example = "EMP-007")]
    pub employee: Assignment,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub warranty_expiry: Option<NaiveDate>,
    #[serde(default)]
    pub specs: BTreeMap<String, String>,
    #[serde(default)]
    pub invoice_line_item_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Asset {
    pub fn is_assigned(&self) -> bool {
        self.employee.is_assigned()
    }

    /// Unassigned and in a state fit for deployment
    pub fn is_in_stock(&self) -> bool {
        !self.is_assigned() && self.state.is_deployable()
    }

    /// Short display label, e.g. `Dell Latitude 5440 (ABC1234)`
    pub fn label(&self) -> String {
        format!("{} {} ({})", self.make, self.model, self.service_tag)
    }
}

/// Create asset request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAsset {
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    #[validate(length(min = 1, message = "Make is required"))]
    pub make: String,
    #[validate(length(min = 1, message = "Model is required"))]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<i64>,
    #[validate(length(min = 1, message = "Service tag is required"))]
    pub service_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<AssetState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "EMP-007")]
    pub employee: Option<Assignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty_expiry: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub specs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_line_item_id: Option<i64>,
}

impl CreateAsset {
    /// Materialize the record under a freshly allocated id.
    pub fn into_asset(self, id: i64, now: DateTime<Utc>) -> Asset {
        Asset {
            id,
            category: self.category,
            make: self.make,
            model: self.model,
            model_id: self.model_id,
            service_tag: self.service_tag.trim().to_string(),
            state: self.state.unwrap_or(AssetState::New),
            employee: self.employee.unwrap_or_default(),
            location: self.location.unwrap_or_else(|| "Office".to_string()),
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            warranty_expiry: self.warranty_expiry,
            specs: self.specs,
            invoice_line_item_id: self.invoice_line_item_id,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

/// Update asset request; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAsset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<AssetState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "EMP-007")]
    pub employee: Option<Assignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty_expiry: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specs: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_line_item_id: Option<i64>,
}

impl UpdateAsset {
    pub fn assign(employee: Assignment) -> Self {
        Self {
            employee: Some(employee),
            ..Default::default()
        }
    }

    pub fn state(state: AssetState) -> Self {
        Self {
            state: Some(state),
            ..Default::default()
        }
    }

    pub fn apply(self, asset: &mut Asset, now: DateTime<Utc>) {
        if let Some(v) = self.category {
            asset.category = v;
        }
        if let Some(v) = self.make {
            asset.make = v;
        }
        if let Some(v) = self.model {
            asset.model = v;
        }
        if let Some(v) = self.model_id {
            asset.model_id = Some(v);
        }
        if let Some(v) = self.service_tag {
            asset.service_tag = v.trim().to_string();
        }
        if let Some(v) = self.state {
            asset.state = v;
        }
        if let Some(v) = self.employee {
            asset.employee = v;
        }
        if let Some(v) = self.location {
            asset.location = v;
        }
        if let Some(v) = self.notes {
            asset.notes = Some(v).filter(|n| !n.trim().is_empty());
        }
        if let Some(v) = self.warranty_expiry {
            asset.warranty_expiry = Some(v);
        }
        if let Some(v) = self.specs {
            asset.specs = v;
        }
        if let Some(v) = self.invoice_line_item_id {
            asset.invoice_line_item_id = Some(v);
        }
        asset.updated_at = Some(now);
    }
}

/// Asset list filters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct AssetQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Employee id or full name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl AssetQuery {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Default::default()
        }
    }

    /// Same filters, one page of a bulk walk
    pub fn at_page(&self, page: usize) -> Self {
        Self {
            page: Some(page),
            page_size: Some(super::pagination::BULK_PAGE_SIZE),
            ..self.clone()
        }
    }
}
