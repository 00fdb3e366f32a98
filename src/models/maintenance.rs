//! Maintenance ticket model

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{
    MaintenanceCategory, MaintenancePriority, MaintenanceStatus, TimelineEventKind, WarrantyStatus,
};

/// Single point-in-time entry of a ticket's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimelineEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TimelineEventKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub user: String,
}

impl TimelineEvent {
    pub fn new(
        kind: TimelineEventKind,
        title: impl Into<String>,
        description: Option<String>,
        user: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            title: title.into(),
            description,
            timestamp,
            user: user.into(),
        }
    }
}

/// Comment or internal note on a ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_internal: bool,
}

/// Cost breakdown of a maintenance task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceCost {
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub parts_cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub labor_cost: Decimal,
    /// ISO currency code
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
}

impl MaintenanceCost {
    pub fn total(&self) -> Decimal {
        self.parts_cost + self.labor_cost
    }
}

/// Maintenance activity performed on an asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRecord {
    /// `MNT-001` style identifier
    pub id: String,
    /// Service tag of the asset
    pub asset_tag: String,
    #[serde(default)]
    pub asset_category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_model: Option<String>,
    pub issue: String,
    #[serde(default)]
    pub description: String,
    pub priority: MaintenancePriority,
    pub category: MaintenanceCategory,
    pub status: MaintenanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technician: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_user: Option<String>,
    pub reported_by: String,
    pub reported_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<NaiveDate>,
    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<MaintenanceCost>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<f64>)]
    pub estimated_cost: Option<Decimal>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<f64>)]
    pub actual_cost: Option<Decimal>,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
}

impl MaintenanceRecord {
    pub fn is_open(&self) -> bool {
        matches!(
            self.status,
            MaintenanceStatus::Pending | MaintenanceStatus::InProgress | MaintenanceStatus::Scheduled
        )
    }
}

/// Create maintenance request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaintenance {
    #[validate(length(min = 1, message = "Asset tag is required"))]
    pub asset_tag: String,
    #[serde(default)]
    pub asset_category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_model: Option<String>,
    #[validate(length(min = 1, message = "Issue is required"))]
    pub issue: String,
    #[serde(default)]
    pub description: String,
    pub priority: MaintenancePriority,
    pub category: MaintenanceCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MaintenanceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technician: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_user: Option<String>,
    #[validate(length(min = 1, message = "Reporter is required"))]
    pub reported_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<f64>)]
    pub estimated_cost: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
    /// Pre-existing history, kept when records are migrated in
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub timeline: Vec<TimelineEvent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
}

impl CreateMaintenance {
    pub fn into_record(self, id: String, now: DateTime<Utc>) -> MaintenanceRecord {
        MaintenanceRecord {
            id,
            asset_tag: self.asset_tag.trim().to_string(),
            asset_category: self.asset_category,
            asset_make: self.asset_make,
            asset_model: self.asset_model,
            issue: self.issue,
            description: self.description,
            priority: self.priority,
            category: self.category,
            status: self.status.unwrap_or(MaintenanceStatus::Pending),
            technician: self.technician.filter(|t| !t.trim().is_empty()),
            assigned_to_user: self.assigned_to_user,
            reported_by: self.reported_by,
            reported_date: self.reported_date.unwrap_or_else(|| now.date_naive()),
            scheduled_date: self.scheduled_date,
            completed_date: None,
            timeline: self.timeline,
            comments: self.comments,
            cost: None,
            estimated_cost: self.estimated_cost,
            actual_cost: None,
            notes: self.notes,
            attachments: self.attachments,
        }
    }
}

/// Update maintenance request; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMaintenance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<MaintenancePriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<MaintenanceCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MaintenanceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technician: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<MaintenanceCost>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<f64>)]
    pub estimated_cost: Option<Decimal>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<f64>)]
    pub actual_cost: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<Vec<TimelineEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
}

impl UpdateMaintenance {
    pub fn apply(self, record: &mut MaintenanceRecord) {
        if let Some(v) = self.asset_tag {
            record.asset_tag = v;
        }
        if let Some(v) = self.asset_category {
            record.asset_category = v;
        }
        if let Some(v) = self.asset_make {
            record.asset_make = Some(v);
        }
        if let Some(v) = self.asset_model {
            record.asset_model = Some(v);
        }
        if let Some(v) = self.issue {
            record.issue = v;
        }
        if let Some(v) = self.description {
            record.description = v;
        }
        if let Some(v) = self.priority {
            record.priority = v;
        }
        if let Some(v) = self.category {
            record.category = v;
        }
        if let Some(v) = self.status {
            record.status = v;
        }
        if let Some(v) = self.technician {
            record.technician = Some(v).filter(|t| !t.trim().is_empty());
        }
        if let Some(v) = self.assigned_to_user {
            record.assigned_to_user = Some(v);
        }
        if let Some(v) = self.scheduled_date {
            record.scheduled_date = Some(v);
        }
        if let Some(v) = self.completed_date {
            record.completed_date = Some(v);
        }
        if let Some(v) = self.cost {
            record.cost = Some(v);
        }
        if let Some(v) = self.estimated_cost {
            record.estimated_cost = Some(v);
        }
        if let Some(v) = self.actual_cost {
            record.actual_cost = Some(v);
        }
        if let Some(v) = self.notes {
            record.notes = v;
        }
        if let Some(v) = self.attachments {
            record.attachments = v;
        }
        if let Some(v) = self.timeline {
            record.timeline = v;
        }
        if let Some(v) = self.comments {
            record.comments = v;
        }
    }
}

/// Status change request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusUpdateRequest {
    pub status: MaintenanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// New comment request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    #[validate(length(min = 1, message = "Comment cannot be empty"))]
    pub content: String,
    #[serde(default)]
    pub is_internal: bool,
}

/// Move several tickets to the same status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkStatusRequest {
    pub ids: Vec<String>,
    pub status: MaintenanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Maintenance list filters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MaintenanceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<MaintenanceCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<MaintenancePriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl MaintenanceQuery {
    /// Same filters, one page of a bulk walk
    pub fn at_page(&self, page: usize) -> Self {
        Self {
            page: Some(page),
            page_size: Some(super::pagination::BULK_PAGE_SIZE),
            ..self.clone()
        }
    }
}

/// Warranty summary of one asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WarrantyInfo {
    pub asset_tag: String,
    pub asset_category: String,
    pub make: String,
    pub model: String,
    pub employee: String,
    pub warranty_expiry: NaiveDate,
    pub days_until_expiry: i64,
    pub status: WarrantyStatus,
}

impl WarrantyInfo {
    pub fn days_between(today: NaiveDate, expiry: NaiveDate) -> i64 {
        (expiry - today).num_days()
    }
}
