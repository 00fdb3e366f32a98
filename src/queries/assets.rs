//! Asset queries

use serde_json::{json, Map, Value};

use crate::{
    cache::{fields_of, patch_record, MutationSpec, QueryClient, ASSET_KEYS, EMPLOYEE_KEYS},
    error::AppResult,
    models::{
        Asset, AssetQuery, AssetState, AssignAssetRequest, BulkResult, CreateAsset,
        InventoryStats, PaginatedResponse, UnassignAssetRequest, UpdateAsset, UNASSIGNED,
    },
    services::{deployment::DeploymentService, inventory::InventoryService, Services},
};

#[derive(Clone)]
pub struct AssetQueries {
    client: QueryClient,
    inventory: InventoryService,
    deployment: DeploymentService,
}

fn employee_field(reference: &str) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("employee".to_string(), Value::from(reference));
    fields
}

impl AssetQueries {
    pub fn new(client: QueryClient, services: &Services) -> Self {
        Self {
            client,
            inventory: services.inventory.clone(),
            deployment: services.deployment.clone(),
        }
    }

    pub fn client(&self) -> &QueryClient {
        &self.client
    }

    pub async fn list(&self, query: &AssetQuery) -> AppResult<PaginatedResponse<Asset>> {
        self.client
            .fetch_query(ASSET_KEYS.list(query), || self.inventory.list(query))
            .await
    }

    pub async fn detail(&self, id: i64) -> AppResult<Asset> {
        self.client
            .fetch_query(ASSET_KEYS.detail(id), || self.inventory.get(id))
            .await
    }

    pub async fn search(&self, term: &str) -> AppResult<Vec<Asset>> {
        let key = ASSET_KEYS.all().child("search").child(term.trim().to_lowercase());
        self.client.fetch_query(key, || self.inventory.search(term)).await
    }

    pub async fn stats(&self) -> AppResult<InventoryStats> {
        self.client
            .fetch_query(ASSET_KEYS.all().child("stats"), || self.inventory.stats())
            .await
    }

    pub async fn create(&self, data: CreateAsset) -> AppResult<Asset> {
        let spec = MutationSpec::new("add asset", ASSET_KEYS.all()).on_success("Asset added");
        self.client.mutate(spec, self.inventory.create(data)).await
    }

    pub async fn update(&self, id: i64, data: UpdateAsset) -> AppResult<Asset> {
        let spec = MutationSpec::new("update asset", ASSET_KEYS.all())
            .merging(id, fields_of(&data))
            .invalidating(EMPLOYEE_KEYS.all())
            .on_success("Asset updated");
        self.client.mutate(spec, self.inventory.update(id, data)).await
    }

    /// Cache effect of handing `asset_id` to `employee`: the cached record shows the
    /// reference exactly as given until the server answer replaces it.
    pub fn assign_spec(asset_id: i64, employee: &str) -> MutationSpec {
        MutationSpec::new("assign asset", ASSET_KEYS.all())
            .merging(asset_id, employee_field(employee))
            .invalidating(EMPLOYEE_KEYS.all())
            .on_success(format!("Asset assigned to {}", employee))
    }

    pub fn unassign_spec(asset_id: i64) -> MutationSpec {
        MutationSpec::new("unassign asset", ASSET_KEYS.all())
            .merging(asset_id, employee_field(UNASSIGNED))
            .invalidating(EMPLOYEE_KEYS.all())
            .on_success("Asset returned to stock")
    }

    pub async fn assign(&self, asset_id: i64, employee: &str) -> AppResult<Asset> {
        let request = AssignAssetRequest {
            asset_id,
            employee_id: employee.to_string(),
            notes: None,
        };
        self.client
            .mutate(Self::assign_spec(asset_id, employee), self.deployment.assign(request))
            .await
    }

    pub async fn unassign(&self, asset_id: i64) -> AppResult<Asset> {
        let request = UnassignAssetRequest {
            asset_id,
            notes: None,
        };
        self.client
            .mutate(Self::unassign_spec(asset_id), self.deployment.unassign(request))
            .await
    }

    pub async fn bulk_update_state(&self, ids: Vec<i64>, state: AssetState) -> AppResult<BulkResult> {
        let targets: Vec<Value> = ids.iter().map(|id| json!(id)).collect();
        let mut fields = Map::new();
        fields.insert("state".to_string(), json!(state));
        let spec = MutationSpec::new("update assets", ASSET_KEYS.all()).with_patch(move |_, value| {
            targets
                .iter()
                .fold(false, |hit, id| patch_record(value, id, &fields) || hit)
        });
        self.client
            .mutate(spec, async { self.inventory.bulk_update_state(&ids, state).await })
            .await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let spec = MutationSpec::new("delete asset", ASSET_KEYS.all())
            .removing(id)
            .on_success("Asset deleted");
        self.client.mutate(spec, self.inventory.delete(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::repository::{fixture::FixtureSource, Repository};
    use std::sync::Arc;

    fn queries() -> AssetQueries {
        let source = FixtureSource::in_memory().unwrap();
        let services = Services::new(Repository::new(Arc::new(source)));
        AssetQueries::new(QueryClient::new(), &services)
    }

    fn holder(list: &PaginatedResponse<Asset>, id: i64) -> Option<String> {
        list.data
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.employee.to_string())
    }

    #[tokio::test]
    async fn test_assign_then_refetch_shows_server_reference() {
        let q = queries();
        let all = AssetQuery::default();
        assert_eq!(holder(&q.list(&all).await.unwrap(), 7).as_deref(), Some(UNASSIGNED));

        let asset = q.assign(7, "Jane Doe").await.unwrap();
        assert_eq!(asset.employee.reference(), Some("EMP-007"));
        assert!(q.client().is_stale(&ASSET_KEYS.list(&all)));

        let refreshed = q.list(&all).await.unwrap();
        assert_eq!(holder(&refreshed, 7).as_deref(), Some("EMP-007"));
    }

    #[tokio::test]
    async fn test_failed_assign_restores_list() {
        let q = queries();
        let all = AssetQuery::default();
        let before = q.list(&all).await.unwrap();

        let err = q.assign(7, "Nobody Known").await.unwrap_err();
        assert!(err.is_not_found());

        let cached: PaginatedResponse<Asset> = q.client().get_query_data(&ASSET_KEYS.list(&all)).unwrap();
        assert_eq!(cached, before);
    }

    #[tokio::test]
    async fn test_delete_removes_from_cached_list_before_refetch() {
        let q = queries();
        let all = AssetQuery::default();
        q.list(&all).await.unwrap();

        q.delete(12).await.unwrap();
        let cached: PaginatedResponse<Asset> = q.client().get_query_data(&ASSET_KEYS.list(&all)).unwrap();
        assert!(cached.data.iter().all(|a| a.id != 12));
        assert_eq!(cached.pagination.total_items, 11);

        let err = q.detail(12).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_bulk_state_patches_every_target() {
        let q = queries();
        let all = AssetQuery::default();
        q.list(&all).await.unwrap();

        let result = q.bulk_update_state(vec![1, 2, 404], AssetState::Fair).await.unwrap();
        assert_eq!(result.succeeded, 2);
        assert_eq!(result.failed.len(), 1);

        let refreshed = q.list(&all).await.unwrap();
        let states: Vec<AssetState> = refreshed.data.iter().filter(|a| a.id <= 2).map(|a| a.state).collect();
        assert_eq!(states, vec![AssetState::Fair, AssetState::Fair]);
    }
}
