//! Mutations with optimistic cache updates
//!
//! [`QueryClient::mutate`] runs a write in six steps:
//!
//! 1. cancel in-flight reads of the key family,
//! 2. snapshot the family,
//! 3. apply the optimistic patch (if any), visible before the call resolves,
//! 4. run the call,
//! 5. on failure restore the snapshot verbatim and notify,
//! 6. invalidate the family whatever the outcome.
//!
//! A mutation dropped while its call is pending is treated as failed: the
//! snapshot is restored and the family invalidated, without a notification.
//! Nothing is retried.

use serde::Serialize;
use serde_json::{Map, Value};
use std::future::Future;

use super::client::{CacheEvent, CacheSnapshot, QueryClient};
use super::keys::QueryKey;
use super::notify::Notification;
use crate::error::AppResult;

type Patch = Box<dyn Fn(&QueryKey, &mut Value) -> bool + Send + Sync>;

/// What a mutation touches in the cache
pub struct MutationSpec {
    label: String,
    family: QueryKey,
    patch: Option<Patch>,
    invalidate: Vec<QueryKey>,
    success_message: Option<String>,
}

impl MutationSpec {
    /// `label` completes "Failed to ..." in the error notification
    pub fn new(label: impl Into<String>, family: QueryKey) -> Self {
        Self {
            label: label.into(),
            family,
            patch: None,
            invalidate: Vec::new(),
            success_message: None,
        }
    }

    pub fn with_patch<F>(mut self, patch: F) -> Self
    where
        F: Fn(&QueryKey, &mut Value) -> bool + Send + Sync + 'static,
    {
        self.patch = Some(Box::new(patch));
        self
    }

    /// Merge `fields` into record `id` wherever it is cached
    pub fn merging(self, id: impl Serialize, fields: Map<String, Value>) -> Self {
        let id = serde_json::to_value(id).unwrap_or(Value::Null);
        self.with_patch(move |_, value| patch_record(value, &id, &fields))
    }

    /// Drop record `id` from cached lists
    pub fn removing(self, id: impl Serialize) -> Self {
        let id = serde_json::to_value(id).unwrap_or(Value::Null);
        self.with_patch(move |_, value| remove_record(value, &id))
    }

    /// Extra family invalidated once the mutation settles
    pub fn invalidating(mut self, key: QueryKey) -> Self {
        self.invalidate.push(key);
        self
    }

    pub fn on_success(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn family(&self) -> &QueryKey {
        &self.family
    }

    pub fn is_optimistic(&self) -> bool {
        self.patch.is_some()
    }
}

/// Undoes a pending mutation's cache effects unless it settles.
///
/// Created right after the snapshot. If the `mutate` future is dropped before the
/// call resolves, `Drop` restores the snapshot, releases the hold and invalidates
/// the touched families.
struct PendingMutation<'a> {
    client: &'a QueryClient,
    family: QueryKey,
    invalidate: Vec<QueryKey>,
    snapshot: Option<CacheSnapshot>,
    held: bool,
    settled: bool,
}

impl<'a> PendingMutation<'a> {
    fn new(client: &'a QueryClient, spec: &MutationSpec) -> Self {
        Self {
            client,
            family: spec.family.clone(),
            invalidate: spec.invalidate.clone(),
            snapshot: Some(client.snapshot(&spec.family)),
            held: false,
            settled: false,
        }
    }

    fn hold(&mut self) {
        self.client.hold(&self.family);
        self.held = true;
    }

    fn rollback(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.client.restore(snapshot);
        }
    }

    fn settle(&mut self) {
        if self.held {
            self.client.release(&self.family);
            self.held = false;
        }
        self.client.invalidate_queries(&self.family);
        for key in &self.invalidate {
            self.client.invalidate_queries(key);
        }
        self.settled = true;
    }
}

impl Drop for PendingMutation<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!(family = %self.family, "mutation dropped before settling");
            self.rollback();
            self.settle();
        }
    }
}

impl QueryClient {
    pub async fn mutate<T, Fut>(&self, spec: MutationSpec, call: Fut) -> AppResult<T>
    where
        Fut: Future<Output = AppResult<T>>,
    {
        self.cancel_queries(&spec.family);
        let mut pending = PendingMutation::new(self, &spec);

        if let Some(patch) = &spec.patch {
            pending.hold();
            let patched = self.set_queries_data(&spec.family, |key, value| patch(key, value));
            tracing::debug!(family = %spec.family, patched, "optimistic update applied");
        }

        let result = call.await;

        if let Err(e) = &result {
            pending.rollback();
            tracing::warn!(family = %spec.family, "Failed to {}: {}", spec.label, e);
            self.emit(CacheEvent::Notify(Notification::error(format!(
                "Failed to {}: {}",
                spec.label,
                e.user_message()
            ))));
        }
        pending.settle();

        if result.is_ok() {
            if let Some(message) = spec.success_message {
                self.emit(CacheEvent::Notify(Notification::success(message)));
            }
        }
        result
    }
}

fn merge_fields(record: &mut Map<String, Value>, fields: &Map<String, Value>) {
    for (k, v) in fields {
        record.insert(k.clone(), v.clone());
    }
}

/// Merge `fields` into the record with `id`, in a `{data, pagination}` list, a bare
/// array or a single record. Returns whether anything matched.
pub fn patch_record(value: &mut Value, id: &Value, fields: &Map<String, Value>) -> bool {
    match value {
        Value::Array(items) => {
            let mut hit = false;
            for item in items.iter_mut() {
                if let Value::Object(record) = item {
                    if record.get("id") == Some(id) {
                        merge_fields(record, fields);
                        hit = true;
                    }
                }
            }
            hit
        }
        Value::Object(map) if map.get("id") == Some(id) => {
            merge_fields(map, fields);
            true
        }
        Value::Object(map) => match map.get_mut("data") {
            Some(data) => patch_record(data, id, fields),
            None => false,
        },
        _ => false,
    }
}

/// Remove the record with `id` from a list; the list's `totalItems` follows.
/// Single records are left alone.
pub fn remove_record(value: &mut Value, id: &Value) -> bool {
    match value {
        Value::Array(items) => {
            let before = items.len();
            items.retain(|item| item.get("id") != Some(id));
            items.len() != before
        }
        Value::Object(map) => {
            let removed = match map.get_mut("data") {
                Some(Value::Array(items)) => {
                    let before = items.len();
                    items.retain(|item| item.get("id") != Some(id));
                    before - items.len()
                }
                _ => 0,
            };
            if removed == 0 {
                return false;
            }
            if let Some(Value::Object(meta)) = map.get_mut("pagination") {
                let total = meta.get("totalItems").and_then(Value::as_u64).unwrap_or(0);
                let page_size = meta.get("pageSize").and_then(Value::as_u64).unwrap_or(0);
                let total = total.saturating_sub(removed as u64);
                meta.insert("totalItems".to_string(), Value::from(total));
                if page_size > 0 {
                    meta.insert("totalPages".to_string(), Value::from(total.div_ceil(page_size)));
                }
            }
            true
        }
        _ => false,
    }
}

/// Field map of a serializable patch (absent fields skipped by its serde attributes)
pub fn fields_of<T: Serialize>(patch: &T) -> Map<String, Value> {
    match serde_json::to_value(patch) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::keys::ASSET_KEYS;
    use crate::error::AppError;
    use serde_json::json;

    fn list() -> Value {
        json!({
            "data": [
                {"id": 6, "employee": "EMP-005"},
                {"id": 7, "employee": "UNASSIGNED"}
            ],
            "pagination": {"page": 1, "pageSize": 1, "totalItems": 2, "totalPages": 2}
        })
    }

    #[test]
    fn test_patch_record_shapes() {
        let mut fields = Map::new();
        fields.insert("employee".into(), json!("Jane Doe"));

        let mut listed = list();
        assert!(patch_record(&mut listed, &json!(7), &fields));
        assert_eq!(listed["data"][1]["employee"], "Jane Doe");
        assert_eq!(listed["data"][0]["employee"], "EMP-005");

        let mut detail = json!({"id": 7, "employee": "UNASSIGNED"});
        assert!(patch_record(&mut detail, &json!(7), &fields));
        assert_eq!(detail["employee"], "Jane Doe");

        let mut other = json!({"id": 8});
        assert!(!patch_record(&mut other, &json!(7), &fields));
    }

    #[test]
    fn test_remove_record_updates_totals() {
        let mut listed = list();
        assert!(remove_record(&mut listed, &json!(6)));
        assert_eq!(listed["data"].as_array().unwrap().len(), 1);
        assert_eq!(listed["pagination"]["totalItems"], 1);
        assert_eq!(listed["pagination"]["totalPages"], 1);
        assert!(!remove_record(&mut listed, &json!(6)));
    }

    #[tokio::test]
    async fn test_failed_mutation_rolls_back_and_notifies() {
        let client = QueryClient::new();
        let key = ASSET_KEYS.list(&json!({}));
        client.set_query_data(key.clone(), &list()).unwrap();
        let mut events = client.subscribe();

        let mut fields = Map::new();
        fields.insert("employee".into(), json!("Jane Doe"));
        let spec = MutationSpec::new("assign asset", ASSET_KEYS.all()).merging(7, fields);

        let outcome: AppResult<()> = client
            .mutate(spec, async { Err(AppError::Network("connection reset".into())) })
            .await;
        assert!(outcome.is_err());
        assert_eq!(client.get_raw(&key), Some(list()));
        assert!(client.is_stale(&key));

        let mut saw_error = false;
        while let Ok(event) = events.try_recv() {
            if let CacheEvent::Notify(n) = event {
                assert_eq!(n, Notification::error("Failed to assign asset: connection reset"));
                saw_error = true;
            }
        }
        assert!(saw_error);
    }

    #[tokio::test]
    async fn test_dropped_mutation_restores_and_releases() {
        let client = QueryClient::new();
        let key = ASSET_KEYS.detail(7);
        client.set_query_data(key.clone(), &json!({"id": 7, "employee": "UNASSIGNED"})).unwrap();

        let mut fields = Map::new();
        fields.insert("employee".into(), json!("Jane Doe"));
        let spec = MutationSpec::new("assign asset", ASSET_KEYS.all()).merging(7, fields);
        let abandoned = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            client.mutate(spec, std::future::pending::<AppResult<()>>()),
        )
        .await;
        assert!(abandoned.is_err());

        assert_eq!(client.get_raw(&key), Some(json!({"id": 7, "employee": "UNASSIGNED"})));
        assert!(client.is_stale(&key));

        client.invalidate_queries(&ASSET_KEYS.all());
        let fetched: Value = client
            .fetch_query(key.clone(), || async { Ok(json!({"id": 7, "employee": "EMP-003"})) })
            .await
            .unwrap();
        assert_eq!(fetched["employee"], "EMP-003");
    }

    #[tokio::test]
    async fn test_create_only_invalidates() {
        let client = QueryClient::new();
        let key = ASSET_KEYS.list(&json!({}));
        client.set_query_data(key.clone(), &list()).unwrap();

        let spec = MutationSpec::new("add asset", ASSET_KEYS.all()).on_success("Asset added");
        assert!(!spec.is_optimistic());
        let id: i64 = client.mutate(spec, async { Ok(13) }).await.unwrap();
        assert_eq!(id, 13);
        assert_eq!(client.get_raw(&key), Some(list()));
        assert!(client.is_stale(&key));
    }
}
