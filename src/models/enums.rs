//! Shared domain enums

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::AppError;

/// Supported hardware categories
pub const ASSET_CATEGORIES: &[&str] = &[
    "Laptop",
    "Monitor",
    "Docking",
    "Headset",
    "Desktop",
    "Network Switch",
    "Firewall",
    "Access Point",
    "5G/4G Modem",
    "UPS",
    "NVR",
    "Printer",
    "TV",
];

/// Physical locations where assets are deployed
pub const ASSET_LOCATIONS: &[&str] = &["Office", "Server"];

/// Sentinel stored in the `employee` field of an asset nobody holds
pub const UNASSIGNED: &str = "UNASSIGNED";

// ---------------------------------------------------------------------------
// AssetState
// ---------------------------------------------------------------------------

/// Lifecycle state of an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(from = "String", rename_all = "UPPERCASE")]
pub enum AssetState {
    New,
    Good,
    Fair,
    Broken,
}

impl AssetState {
    pub const ALL: [AssetState; 4] = [
        AssetState::New,
        AssetState::Good,
        AssetState::Fair,
        AssetState::Broken,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetState::New => "NEW",
            AssetState::Good => "GOOD",
            AssetState::Fair => "FAIR",
            AssetState::Broken => "BROKEN",
        }
    }

    /// Ready to be handed out from stock
    pub fn is_deployable(&self) -> bool {
        matches!(self, AssetState::New | AssetState::Good)
    }

    /// Counted as needing maintenance on the dashboard
    pub fn needs_attention(&self) -> bool {
        matches!(self, AssetState::Fair | AssetState::Broken)
    }
}

/// Lenient conversion covering the legacy spreadsheet wording. Unknown values are
/// treated as new stock.
impl From<&str> for AssetState {
    fn from(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "GOOD" | "USED" | "WORKING" | "OK" => AssetState::Good,
            "FAIR" | "WORN" | "IN REPAIR" | "REPAIR" => AssetState::Fair,
            "BROKEN" | "DAMAGED" | "FAULTY" | "DEFECTIVE" | "DEAD" => AssetState::Broken,
            _ => AssetState::New,
        }
    }
}

impl From<String> for AssetState {
    fn from(s: String) -> Self {
        AssetState::from(s.as_str())
    }
}

impl fmt::Display for AssetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Assignment
// ---------------------------------------------------------------------------

/// Who holds an asset: nobody, or an employee reference (normally an employee id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Assignment {
    #[default]
    Unassigned,
    Employee(String),
}

impl Assignment {
    pub fn employee(reference: impl Into<String>) -> Self {
        let reference = reference.into();
        let trimmed = reference.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(UNASSIGNED) {
            Assignment::Unassigned
        } else {
            Assignment::Employee(trimmed.to_string())
        }
    }

    pub fn is_assigned(&self) -> bool {
        matches!(self, Assignment::Employee(_))
    }

    pub fn reference(&self) -> Option<&str> {
        match self {
            Assignment::Unassigned => None,
            Assignment::Employee(r) => Some(r),
        }
    }

    pub fn as_str(&self) -> &str {
        self.reference().unwrap_or(UNASSIGNED)
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Assignment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Assignment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(Assignment::employee).unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

/// Lifecycle status of a maintenance ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum MaintenanceStatus {
    Pending,
    InProgress,
    Completed,
    Scheduled,
    Cancelled,
}

impl MaintenanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceStatus::Pending => "pending",
            MaintenanceStatus::InProgress => "in-progress",
            MaintenanceStatus::Completed => "completed",
            MaintenanceStatus::Scheduled => "scheduled",
            MaintenanceStatus::Cancelled => "cancelled",
        }
    }

    /// Allowed ticket moves. Completed tickets are closed for good, cancelled ones
    /// may only be reopened.
    pub fn can_transition_to(&self, next: MaintenanceStatus) -> bool {
        use MaintenanceStatus::*;
        match (self, next) {
            (Pending, InProgress | Scheduled | Completed | Cancelled) => true,
            (Scheduled, Pending | InProgress | Cancelled) => true,
            (InProgress, Pending | Completed | Cancelled) => true,
            (Cancelled, Pending) => true,
            _ => false,
        }
    }
}

impl FromStr for MaintenanceStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "pending" => Ok(MaintenanceStatus::Pending),
            "in-progress" => Ok(MaintenanceStatus::InProgress),
            "completed" => Ok(MaintenanceStatus::Completed),
            "scheduled" => Ok(MaintenanceStatus::Scheduled),
            "cancelled" | "canceled" => Ok(MaintenanceStatus::Cancelled),
            other => Err(AppError::Validation(format!(
                "Unknown maintenance status '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency of a maintenance ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MaintenancePriority {
    Critical,
    High,
    Medium,
    Low,
}

impl MaintenancePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenancePriority::Critical => "critical",
            MaintenancePriority::High => "high",
            MaintenancePriority::Medium => "medium",
            MaintenancePriority::Low => "low",
        }
    }
}

impl fmt::Display for MaintenancePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad segment of a maintenance task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceCategory {
    Hardware,
    Software,
    Network,
    Preventive,
}

impl MaintenanceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceCategory::Hardware => "hardware",
            MaintenanceCategory::Software => "software",
            MaintenanceCategory::Network => "network",
            MaintenanceCategory::Preventive => "preventive",
        }
    }
}

impl fmt::Display for MaintenanceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of entry in a ticket's timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEventKind {
    StatusChange,
    Comment,
    Assignment,
    Creation,
    Update,
}

// ---------------------------------------------------------------------------
// Warranty
// ---------------------------------------------------------------------------

/// Days before expiry from which a warranty is reported as expiring soon
pub const WARRANTY_WARNING_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum WarrantyStatus {
    Active,
    ExpiringSoon,
    Expired,
}

impl WarrantyStatus {
    pub fn from_days_left(days: i64) -> Self {
        if days < 0 {
            WarrantyStatus::Expired
        } else if days <= WARRANTY_WARNING_DAYS {
            WarrantyStatus::ExpiringSoon
        } else {
            WarrantyStatus::Active
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_state_lenient_parsing() {
        assert_eq!(AssetState::from("good"), AssetState::Good);
        assert_eq!(AssetState::from(" Broken "), AssetState::Broken);
        assert_eq!(AssetState::from("Damaged"), AssetState::Broken);
        assert_eq!(AssetState::from("something else"), AssetState::New);
        let parsed: AssetState = serde_json::from_str("\"fair\"").unwrap();
        assert_eq!(parsed, AssetState::Fair);
        assert_eq!(serde_json::to_string(&AssetState::Fair).unwrap(), "\"FAIR\"");
    }

    #[test]
    fn test_assignment_sentinel() {
        let unassigned: Assignment = serde_json::from_str("\"UNASSIGNED\"").unwrap();
        assert_eq!(unassigned, Assignment::Unassigned);
        let empty: Assignment = serde_json::from_str("\"\"").unwrap();
        assert_eq!(empty, Assignment::Unassigned);
        let null: Assignment = serde_json::from_str("null").unwrap();
        assert_eq!(null, Assignment::Unassigned);
        assert_eq!(serde_json::to_string(&Assignment::Unassigned).unwrap(), "\"UNASSIGNED\"");

        let held = Assignment::employee("EMP-004");
        assert_eq!(held.reference(), Some("EMP-004"));
        assert_eq!(serde_json::to_string(&held).unwrap(), "\"EMP-004\"");
    }

    #[test]
    fn test_maintenance_status_transitions() {
        use MaintenanceStatus::*;
        assert!(Pending.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        assert!(Cancelled.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
        assert_eq!("In Progress".parse::<MaintenanceStatus>().unwrap(), InProgress);
        assert!("unknown".parse::<MaintenanceStatus>().is_err());
    }

    #[test]
    fn test_warranty_status() {
        assert_eq!(WarrantyStatus::from_days_left(-1), WarrantyStatus::Expired);
        assert_eq!(WarrantyStatus::from_days_left(0), WarrantyStatus::ExpiringSoon);
        assert_eq!(WarrantyStatus::from_days_left(30), WarrantyStatus::ExpiringSoon);
        assert_eq!(WarrantyStatus::from_days_left(31), WarrantyStatus::Active);
    }
}
