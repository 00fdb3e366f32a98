//! Hardware model (specification template)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Hardware specification template that assets may reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HardwareModel {
    pub id: i64,
    pub name: String,
    pub make: String,
    pub category: String,
    /// Free-form specs (`cpu`, `ram`, `storage`, `resolution`...)
    #[serde(default)]
    pub specs: BTreeMap<String, String>,
}

impl HardwareModel {
    pub fn spec(&self, key: &str) -> &str {
        self.specs.get(key).map(String::as_str).unwrap_or("")
    }
}

/// Create model request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateHardwareModel {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Make is required"))]
    pub make: String,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    #[serde(default)]
    pub specs: BTreeMap<String, String>,
}

impl CreateHardwareModel {
    pub fn into_model(self, id: i64) -> HardwareModel {
        HardwareModel {
            id,
            name: self.name.trim().to_string(),
            make: self.make.trim().to_string(),
            category: self.category,
            specs: self
                .specs
                .into_iter()
                .filter(|(_, v)| !v.trim().is_empty())
                .collect(),
        }
    }
}

/// Update model request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateHardwareModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Merged into the existing specs; an empty value removes the key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specs: Option<BTreeMap<String, String>>,
}

impl UpdateHardwareModel {
    pub fn apply(self, model: &mut HardwareModel) {
        if let Some(v) = self.name {
            model.name = v;
        }
        if let Some(v) = self.make {
            model.make = v;
        }
        if let Some(v) = self.category {
            model.category = v;
        }
        if let Some(specs) = self.specs {
            for (key, value) in specs {
                if value.trim().is_empty() {
                    model.specs.remove(&key);
                } else {
                    model.specs.insert(key, value);
                }
            }
        }
    }
}

/// Model list filters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct ModelQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
}

impl ModelQuery {
    /// Same filters, one page of a bulk walk
    pub fn at_page(&self, page: usize) -> Self {
        Self {
            page: Some(page),
            page_size: Some(super::pagination::BULK_PAGE_SIZE),
            ..self.clone()
        }
    }
}
