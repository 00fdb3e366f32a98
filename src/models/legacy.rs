//! Adapter from the legacy asset shapes to the canonical [`Asset`].
//!
//! Two historical shapes exist: the flat lowercase fixture rows (`servicetag`,
//! `warrantyexpiry`, `additionalcomments`, employee stored by name) and the
//! spreadsheet export with PascalCase, space-separated keys (`"Service Tag"`,
//! `"Warranty Expiry"`). Both deserialize into [`LegacyAsset`] thanks to field
//! aliases and convert through [`LegacyAsset::into_asset`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use std::collections::BTreeMap;

use super::asset::Asset;
use super::employee::Employee;
use super::enums::{AssetState, Assignment};
use super::hardware_model::HardwareModel;

/// Legacy asset row (either shape)
#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyAsset {
    #[serde(alias = "ID", alias = "Id")]
    pub id: Option<i64>,
    #[serde(alias = "Category")]
    pub category: String,
    #[serde(alias = "State")]
    pub state: String,
    #[serde(alias = "Make")]
    pub make: String,
    #[serde(alias = "Model")]
    pub model: String,
    #[serde(alias = "Service Tag", alias = "serviceTag")]
    pub servicetag: String,
    #[serde(alias = "Employee")]
    pub employee: String,
    #[serde(alias = "Location")]
    pub location: String,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(alias = "Warranty Expiry", alias = "warrantyExpiry")]
    pub warrantyexpiry: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(alias = "Additional Comments", alias = "notes")]
    pub additionalcomments: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(alias = "CPU")]
    pub cpu: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(alias = "RAM")]
    pub ram: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(alias = "Storage")]
    pub storage: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(alias = "Dedicated GPU")]
    pub dedicatedgpu: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(rename = "usb-aports", alias = "USB-A Ports")]
    pub usb_a_ports: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(rename = "usb-cports", alias = "USB-C Ports")]
    pub usb_c_ports: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(alias = "Dimensions")]
    pub dimensions: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(alias = "Resolution")]
    pub resolution: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(alias = "Refresh Rate")]
    pub refreshhertz: Option<String>,
}

/// Known employees and models used to resolve the names a legacy row carries.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyContext<'a> {
    pub employees: &'a [Employee],
    pub models: &'a [HardwareModel],
}

impl<'a> LegacyContext<'a> {
    pub fn new(employees: &'a [Employee], models: &'a [HardwareModel]) -> Self {
        Self { employees, models }
    }

    /// Resolve an employee id or full name (case-insensitive) to the employee id.
    pub fn resolve_employee(&self, reference: &str) -> Option<&'a Employee> {
        let needle = reference.trim();
        self.employees
            .iter()
            .find(|e| e.id.eq_ignore_ascii_case(needle))
            .or_else(|| {
                self.employees
                    .iter()
                    .find(|e| e.full_name.trim().eq_ignore_ascii_case(needle))
            })
    }

    pub fn resolve_model(&self, make: &str, name: &str) -> Option<&'a HardwareModel> {
        let name = name.trim();
        let make = make.trim();
        self.models.iter().find(|m| {
            m.name.eq_ignore_ascii_case(name) && (make.is_empty() || m.make.eq_ignore_ascii_case(make))
        })
    }
}

impl LegacyAsset {
    /// Convert into the canonical schema.
    ///
    /// `fallback_id` is used when the row carries no id. Employee names become
    /// employee ids when the employee is known; unknown names are kept verbatim.
    pub fn into_asset(self, fallback_id: i64, ctx: &LegacyContext<'_>, now: DateTime<Utc>) -> Asset {
        let employee = match Assignment::employee(self.employee.as_str()) {
            Assignment::Unassigned => Assignment::Unassigned,
            Assignment::Employee(reference) => match ctx.resolve_employee(&reference) {
                Some(found) => Assignment::Employee(found.id.clone()),
                None => Assignment::Employee(reference),
            },
        };
        let model_id = ctx.resolve_model(&self.make, &self.model).map(|m| m.id);

        let specs: BTreeMap<String, String> = [
            ("cpu", self.cpu),
            ("ram", self.ram),
            ("storage", self.storage),
            ("dedicatedgpu", self.dedicatedgpu),
            ("usb-aports", self.usb_a_ports),
            ("usb-cports", self.usb_c_ports),
            ("dimensions", self.dimensions),
            ("resolution", self.resolution),
            ("refreshhertz", self.refreshhertz),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k.to_string(), v.trim().to_string())))
        .filter(|(_, v)| !v.is_empty())
        .collect();

        let location = self.location.trim();

        Asset {
            id: self.id.unwrap_or(fallback_id),
            category: non_empty_or(self.category, "Laptop"),
            make: non_empty_or(self.make, "Unknown"),
            model: non_empty_or(self.model, "Unknown"),
            model_id,
            service_tag: self.servicetag.trim().to_string(),
            state: AssetState::from(self.state.as_str()),
            employee,
            location: if location.is_empty() { "Office".to_string() } else { location.to_string() },
            notes: self.additionalcomments.filter(|c| !c.trim().is_empty()),
            warranty_expiry: self.warrantyexpiry.as_deref().and_then(parse_date),
            specs,
            invoice_line_item_id: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

fn non_empty_or(value: String, default: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parse the date formats found in legacy data (`2025-06-30`, `06/30/2025`,
/// `2025/06/30`, RFC 3339 timestamps).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("n/a") {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d.%m.%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Convert a list of legacy rows, numbering rows without ids after the highest id seen.
pub fn convert_all(rows: Vec<LegacyAsset>, ctx: &LegacyContext<'_>) -> Vec<Asset> {
    let now = Utc::now();
    let mut next_id = rows.iter().filter_map(|r| r.id).max().unwrap_or(0) + 1;
    rows.into_iter()
        .map(|row| {
            let fallback = next_id;
            if row.id.is_none() {
                next_id += 1;
            }
            row.into_asset(fallback, ctx, now)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employees() -> Vec<Employee> {
        vec![Employee {
            id: "EMP-002".into(),
            full_name: "Jane Doe".into(),
            email: "jane.doe@example.com".into(),
            department: "Finance".into(),
            position: "Analyst".into(),
            is_active: true,
        }]
    }

    #[test]
    fn test_flat_shape() {
        let row: LegacyAsset = serde_json::from_value(serde_json::json!({
            "id": 3,
            "category": "Laptop",
            "state": "Good",
            "warrantyexpiry": "2026-01-31",
            "make": "Dell",
            "model": "Latitude 5440",
            "cpu": "i5",
            "ram": "",
            "servicetag": "7XK2P3",
            "employee": "jane doe",
            "additionalcomments": "",
            "location": "Office"
        }))
        .unwrap();

        let staff = employees();
        let ctx = LegacyContext::new(&staff, &[]);
        let asset = row.into_asset(99, &ctx, Utc::now());
        assert_eq!(asset.id, 3);
        assert_eq!(asset.state, AssetState::Good);
        assert_eq!(asset.employee.reference(), Some("EMP-002"));
        assert_eq!(asset.warranty_expiry, NaiveDate::from_ymd_opt(2026, 1, 31));
        assert_eq!(asset.specs.get("cpu").map(String::as_str), Some("i5"));
        assert!(!asset.specs.contains_key("ram"));
        assert!(asset.notes.is_none());
    }

    #[test]
    fn test_pascal_case_shape() {
        let row: LegacyAsset = serde_json::from_value(serde_json::json!({
            "Make": "HP",
            "Model": "E24",
            "Category": "Monitor",
            "Service Tag": "CN123",
            "State": "Damaged",
            "Employee": "UNASSIGNED",
            "Location": "",
            "Warranty Expiry": "06/30/2025",
            "Refresh Rate": "60Hz"
        }))
        .unwrap();

        let asset = row.into_asset(12, &LegacyContext::default(), Utc::now());
        assert_eq!(asset.id, 12);
        assert_eq!(asset.service_tag, "CN123");
        assert_eq!(asset.state, AssetState::Broken);
        assert_eq!(asset.employee, Assignment::Unassigned);
        assert_eq!(asset.location, "Office");
        assert_eq!(asset.warranty_expiry, NaiveDate::from_ymd_opt(2025, 6, 30));
        assert_eq!(asset.specs.get("refreshhertz").map(String::as_str), Some("60Hz"));
    }

    #[test]
    fn test_unknown_employee_name_is_kept() {
        let row = LegacyAsset {
            servicetag: "X1".into(),
            employee: "Former Contractor".into(),
            ..Default::default()
        };
        let asset = row.into_asset(1, &LegacyContext::default(), Utc::now());
        assert_eq!(asset.employee.reference(), Some("Former Contractor"));
        assert_eq!(asset.make, "Unknown");
    }

    #[test]
    fn test_convert_all_numbers_missing_ids() {
        let rows = vec![
            LegacyAsset { id: Some(5), ..Default::default() },
            LegacyAsset::default(),
            LegacyAsset::default(),
        ];
        let ids: Vec<i64> = convert_all(rows, &LegacyContext::default())
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec![5, 6, 7]);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 6, 30);
        assert_eq!(parse_date("2025-06-30"), expected);
        assert_eq!(parse_date("2025/06/30"), expected);
        assert_eq!(parse_date("2025-06-30T10:00:00Z"), expected);
        assert_eq!(parse_date("N/A"), None);
        assert_eq!(parse_date("soon"), None);
    }
}
