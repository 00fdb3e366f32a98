//! Hierarchical query keys
//!
//! Every entity owns a key tree rooted at its name:
//!
//! ```text
//! assets                      all()
//! assets/list                 lists()
//! assets/list/{"page":1}      list(filters)
//! assets/detail               details()
//! assets/detail/7             detail(id)
//! ```
//!
//! Operations that take a prefix (cancel, invalidate, snapshot...) apply to the key
//! and everything below it.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Key one level below this one
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// True when `self` is `prefix` or lies below it
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0.iter().zip(&prefix.0).all(|(a, b)| a == b)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// Key tree of one entity
#[derive(Debug, Clone, Copy)]
pub struct KeyFactory {
    entity: &'static str,
}

pub const ASSET_KEYS: KeyFactory = KeyFactory::new("assets");
pub const EMPLOYEE_KEYS: KeyFactory = KeyFactory::new("employees");
pub const MAINTENANCE_KEYS: KeyFactory = KeyFactory::new("maintenance");
pub const MODEL_KEYS: KeyFactory = KeyFactory::new("models");
pub const INVOICE_KEYS: KeyFactory = KeyFactory::new("invoices");

impl KeyFactory {
    pub const fn new(entity: &'static str) -> Self {
        Self { entity }
    }

    pub fn all(&self) -> QueryKey {
        QueryKey::new([self.entity])
    }

    pub fn lists(&self) -> QueryKey {
        self.all().child("list")
    }

    /// One list view; equal filter sets map to the same key whatever their field order
    pub fn list<F: Serialize + ?Sized>(&self, filters: &F) -> QueryKey {
        let value = serde_json::to_value(filters).unwrap_or(Value::Null);
        self.lists().child(canonical_json(&value))
    }

    pub fn details(&self) -> QueryKey {
        self.all().child("detail")
    }

    pub fn detail(&self, id: impl fmt::Display) -> QueryKey {
        self.details().child(id.to_string())
    }
}

/// Compact JSON with object keys sorted and null members dropped
pub fn canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut members: Vec<(&String, &Value)> =
                map.iter().filter(|(_, v)| !v.is_null()).collect();
            members.sort_by(|a, b| a.0.cmp(b.0));
            let body: Vec<String> = members
                .into_iter()
                .map(|(k, v)| format!("{}:{}", Value::String(k.clone()), canonical_json(v)))
                .collect();
            format!("{{{}}}", body.join(","))
        }
        Value::Array(items) => {
            let body: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", body.join(","))
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetQuery;
    use serde_json::json;

    #[test]
    fn test_hierarchy() {
        let detail = ASSET_KEYS.detail(7);
        assert_eq!(detail.to_string(), "assets/detail/7");
        assert!(detail.starts_with(&ASSET_KEYS.details()));
        assert!(detail.starts_with(&ASSET_KEYS.all()));
        assert!(!detail.starts_with(&ASSET_KEYS.lists()));
        assert!(!detail.starts_with(&EMPLOYEE_KEYS.all()));
        assert!(ASSET_KEYS.all().starts_with(&ASSET_KEYS.all()));
    }

    #[test]
    fn test_list_keys_are_canonical() {
        let a = ASSET_KEYS.list(&json!({"state": "NEW", "page": 1, "search": null}));
        let b = ASSET_KEYS.list(&json!({"page": 1, "state": "NEW"}));
        assert_eq!(a, b);
        assert_eq!(a.segments()[2], r#"{"page":1,"state":"NEW"}"#);

        let typed = ASSET_KEYS.list(&AssetQuery {
            state: Some("NEW".into()),
            page: Some(1),
            ..Default::default()
        });
        assert_eq!(typed, a);
        assert_ne!(ASSET_KEYS.list(&AssetQuery::default()), a);
    }
}
