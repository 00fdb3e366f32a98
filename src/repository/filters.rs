//! In-memory list filtering shared by the fixture data source

use serde::Serialize;
use serde_json::Value;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::models::{
    Asset, AssetQuery, Employee, EmployeeQuery, HardwareModel, Invoice, InvoiceQuery,
    MaintenanceQuery, MaintenanceRecord, ModelQuery, UNASSIGNED,
};

/// Lowercase and strip diacritics (`"Zoë Ém"` -> `"zoe em"`)
pub fn normalize(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

fn value_contains(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => normalize(s).contains(needle),
        Value::Number(n) => n.to_string().contains(needle),
        Value::Bool(b) => b.to_string() == needle,
        Value::Array(items) => items.iter().any(|v| value_contains(v, needle)),
        Value::Object(map) => map.values().any(|v| value_contains(v, needle)),
        Value::Null => false,
    }
}

/// Accent- and case-insensitive substring match over every field of `record`
pub fn matches_search<T: Serialize>(record: &T, term: &str) -> bool {
    let needle = normalize(term.trim());
    if needle.is_empty() {
        return true;
    }
    serde_json::to_value(record)
        .map(|v| value_contains(&v, &needle))
        .unwrap_or(false)
}

fn non_empty(filter: &Option<String>) -> Option<&str> {
    filter.as_deref().map(str::trim).filter(|s| !s.is_empty() && *s != "all")
}

/// Employee ids an asset `employee` filter refers to: an exact id, or every
/// employee whose name contains the filter.
fn employee_ids_for(filter: &str, employees: &[Employee]) -> Vec<String> {
    if let Some(e) = employees.iter().find(|e| e.id.eq_ignore_ascii_case(filter)) {
        return vec![e.id.clone()];
    }
    let needle = normalize(filter);
    employees
        .iter()
        .filter(|e| normalize(&e.full_name).contains(&needle))
        .map(|e| e.id.clone())
        .collect()
}

pub fn filter_assets(assets: &[Asset], employees: &[Employee], query: &AssetQuery) -> Vec<Asset> {
    let category = non_empty(&query.category);
    let state = non_empty(&query.state);
    let location = non_empty(&query.location).map(normalize);
    let search = non_empty(&query.search);
    let employee = non_empty(&query.employee).map(|filter| {
        (filter.to_string(), employee_ids_for(filter, employees))
    });

    assets
        .iter()
        .filter(|a| category.map_or(true, |c| a.category.eq_ignore_ascii_case(c)))
        .filter(|a| state.map_or(true, |s| a.state.as_str().eq_ignore_ascii_case(s)))
        .filter(|a| match &employee {
            None => true,
            Some((filter, _)) if filter.eq_ignore_ascii_case(UNASSIGNED) => !a.is_assigned(),
            Some((filter, ids)) => a.employee.reference().is_some_and(|r| {
                r.eq_ignore_ascii_case(filter) || ids.iter().any(|id| id == r)
            }),
        })
        .filter(|a| {
            location
                .as_ref()
                .map_or(true, |l| normalize(&a.location).contains(l.as_str()))
        })
        .filter(|a| search.map_or(true, |s| matches_search(*a, s)))
        .cloned()
        .collect()
}

pub fn filter_employees(employees: &[Employee], query: &EmployeeQuery) -> Vec<Employee> {
    let department = non_empty(&query.department);
    let search = non_empty(&query.search);

    employees
        .iter()
        .filter(|e| department.map_or(true, |d| e.department.eq_ignore_ascii_case(d)))
        .filter(|e| query.is_active.map_or(true, |active| e.is_active == active))
        .filter(|e| search.map_or(true, |s| matches_search(*e, s)))
        .cloned()
        .collect()
}

pub fn filter_maintenance(records: &[MaintenanceRecord], query: &MaintenanceQuery) -> Vec<MaintenanceRecord> {
    let search = non_empty(&query.search);

    records
        .iter()
        .filter(|r| query.status.map_or(true, |s| r.status == s))
        .filter(|r| query.category.map_or(true, |c| r.category == c))
        .filter(|r| query.priority.map_or(true, |p| r.priority == p))
        .filter(|r| search.map_or(true, |s| matches_search(*r, s)))
        .cloned()
        .collect()
}

pub fn filter_models(models: &[HardwareModel], query: &ModelQuery) -> Vec<HardwareModel> {
    let category = non_empty(&query.category);
    let make = non_empty(&query.make);
    let search = non_empty(&query.search);

    models
        .iter()
        .filter(|m| category.map_or(true, |c| m.category.eq_ignore_ascii_case(c)))
        .filter(|m| make.map_or(true, |mk| m.make.eq_ignore_ascii_case(mk)))
        .filter(|m| search.map_or(true, |s| matches_search(*m, s)))
        .cloned()
        .collect()
}

pub fn filter_invoices(invoices: &[Invoice], query: &InvoiceQuery) -> Vec<Invoice> {
    let vendor = non_empty(&query.vendor).map(normalize);
    let search = non_empty(&query.search);

    invoices
        .iter()
        .filter(|i| vendor.as_ref().map_or(true, |v| normalize(&i.vendor).contains(v.as_str())))
        .filter(|i| search.map_or(true, |s| matches_search(*i, s)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssetState, Assignment};
    use std::collections::BTreeMap;

    fn asset(id: i64, category: &str, state: AssetState, employee: Assignment, location: &str) -> Asset {
        Asset {
            id,
            category: category.into(),
            make: "Dell".into(),
            model: format!("Model {}", id),
            model_id: None,
            service_tag: format!("TAG{}", id),
            state,
            employee,
            location: location.into(),
            notes: None,
            warranty_expiry: None,
            specs: BTreeMap::new(),
            invoice_line_item_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn staff() -> Vec<Employee> {
        vec![
            Employee {
                id: "EMP-001".into(),
                full_name: "José Álvarez".into(),
                email: "jose@example.com".into(),
                department: "IT".into(),
                position: "Admin".into(),
                is_active: true,
            },
            Employee {
                id: "EMP-002".into(),
                full_name: "Jane Doe".into(),
                email: "jane@example.com".into(),
                department: "Finance".into(),
                position: "Analyst".into(),
                is_active: false,
            },
        ]
    }

    fn inventory() -> Vec<Asset> {
        vec![
            asset(1, "Laptop", AssetState::Good, Assignment::employee("EMP-001"), "Office"),
            asset(2, "Monitor", AssetState::New, Assignment::Unassigned, "Server Room"),
            asset(3, "laptop", AssetState::Broken, Assignment::employee("EMP-002"), "Office"),
        ]
    }

    #[test]
    fn test_normalize_strips_accents() {
        assert_eq!(normalize("José Álvarez"), "jose alvarez");
    }

    #[test]
    fn test_category_and_state_are_case_insensitive() {
        let query = AssetQuery {
            category: Some("LAPTOP".into()),
            state: Some("broken".into()),
            ..Default::default()
        };
        let ids: Vec<i64> = filter_assets(&inventory(), &staff(), &query).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn test_employee_filter_by_name_or_id() {
        let by_name = AssetQuery {
            employee: Some("jose".into()),
            ..Default::default()
        };
        assert_eq!(filter_assets(&inventory(), &staff(), &by_name)[0].id, 1);

        let by_id = AssetQuery {
            employee: Some("emp-002".into()),
            ..Default::default()
        };
        assert_eq!(filter_assets(&inventory(), &staff(), &by_id)[0].id, 3);

        let unassigned = AssetQuery {
            employee: Some(UNASSIGNED.into()),
            ..Default::default()
        };
        assert_eq!(filter_assets(&inventory(), &staff(), &unassigned)[0].id, 2);
    }

    #[test]
    fn test_location_substring_and_search() {
        let query = AssetQuery {
            location: Some("server".into()),
            ..Default::default()
        };
        assert_eq!(filter_assets(&inventory(), &staff(), &query).len(), 1);

        let search = AssetQuery::search("tag3");
        assert_eq!(filter_assets(&inventory(), &staff(), &search)[0].id, 3);

        let all = AssetQuery {
            category: Some("all".into()),
            ..Default::default()
        };
        assert_eq!(filter_assets(&inventory(), &staff(), &all).len(), 3);
    }

    #[test]
    fn test_employee_filters() {
        let query = EmployeeQuery {
            is_active: Some(true),
            search: Some("alvarez".into()),
            ..Default::default()
        };
        let found = filter_employees(&staff(), &query);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "EMP-001");
    }
}
