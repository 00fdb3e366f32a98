//! Employee model

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

fn default_active() -> bool {
    true
}

/// Staff member who can hold assets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// `EMP-001` style identifier
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub position: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Create employee request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployee {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub position: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl CreateEmployee {
    pub fn into_employee(self, id: String) -> Employee {
        Employee {
            id,
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            department: self.department,
            position: self.position,
            is_active: self.is_active.unwrap_or(true),
        }
    }
}

/// Update employee request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Full name cannot be empty"))]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpdateEmployee {
    pub fn apply(self, employee: &mut Employee) {
        if let Some(v) = self.full_name {
            employee.full_name = v;
        }
        if let Some(v) = self.email {
            employee.email = v;
        }
        if let Some(v) = self.department {
            employee.department = v;
        }
        if let Some(v) = self.position {
            employee.position = v;
        }
        if let Some(v) = self.is_active {
            employee.is_active = v;
        }
    }
}

/// Employee list filters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl EmployeeQuery {
    /// Same filters, one page of a bulk walk
    pub fn at_page(&self, page: usize) -> Self {
        Self {
            page: Some(page),
            page_size: Some(super::pagination::BULK_PAGE_SIZE),
            ..self.clone()
        }
    }
}
