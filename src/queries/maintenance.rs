//! Maintenance ticket queries

use serde_json::{json, Map};

use crate::{
    cache::{fields_of, MutationSpec, QueryClient, QueryKey, ASSET_KEYS, MAINTENANCE_KEYS},
    error::AppResult,
    models::{
        AddCommentRequest, CreateMaintenance, MaintenanceQuery, MaintenanceRecord,
        PaginatedResponse, StatusUpdateRequest, UpdateMaintenance,
    },
    services::{maintenance::MaintenanceService, Services},
};

#[derive(Clone)]
pub struct MaintenanceQueries {
    client: QueryClient,
    maintenance: MaintenanceService,
}

fn history_key(asset_tag: &str) -> QueryKey {
    MAINTENANCE_KEYS
        .all()
        .child("history")
        .child(asset_tag.trim().to_lowercase())
}

impl MaintenanceQueries {
    pub fn new(client: QueryClient, services: &Services) -> Self {
        Self {
            client,
            maintenance: services.maintenance.clone(),
        }
    }

    pub async fn list(&self, query: &MaintenanceQuery) -> AppResult<PaginatedResponse<MaintenanceRecord>> {
        self.client
            .fetch_query(MAINTENANCE_KEYS.list(query), || self.maintenance.list(query))
            .await
    }

    pub async fn detail(&self, id: &str) -> AppResult<MaintenanceRecord> {
        self.client
            .fetch_query(MAINTENANCE_KEYS.detail(id), || self.maintenance.get(id))
            .await
    }

    pub async fn history(&self, asset_tag: &str) -> AppResult<Vec<MaintenanceRecord>> {
        self.client
            .fetch_query(history_key(asset_tag), || self.maintenance.history(asset_tag))
            .await
    }

    pub async fn create(&self, data: CreateMaintenance) -> AppResult<MaintenanceRecord> {
        let spec = MutationSpec::new("create ticket", MAINTENANCE_KEYS.all())
            .invalidating(ASSET_KEYS.all())
            .on_success("Maintenance ticket created");
        self.client.mutate(spec, self.maintenance.create(data)).await
    }

    pub async fn update(&self, id: &str, data: UpdateMaintenance) -> AppResult<MaintenanceRecord> {
        let spec = MutationSpec::new("update ticket", MAINTENANCE_KEYS.all())
            .merging(id, fields_of(&data))
            .on_success("Maintenance ticket updated");
        self.client.mutate(spec, self.maintenance.update(id, data)).await
    }

    pub async fn update_status(&self, id: &str, request: StatusUpdateRequest) -> AppResult<MaintenanceRecord> {
        let mut fields = Map::new();
        fields.insert("status".to_string(), json!(request.status));
        let spec = MutationSpec::new("update ticket status", MAINTENANCE_KEYS.all())
            .merging(id, fields)
            .on_success(format!("Status changed to {}", request.status));
        self.client.mutate(spec, self.maintenance.update_status(id, request)).await
    }

    /// Comments get their id server-side, so the cache is only refreshed
    pub async fn add_comment(&self, id: &str, request: AddCommentRequest) -> AppResult<MaintenanceRecord> {
        let spec = MutationSpec::new("add comment", MAINTENANCE_KEYS.all()).on_success("Comment added");
        self.client.mutate(spec, self.maintenance.add_comment(id, request)).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let spec = MutationSpec::new("delete ticket", MAINTENANCE_KEYS.all())
            .removing(id)
            .on_success("Maintenance ticket deleted");
        self.client.mutate(spec, self.maintenance.delete(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::MaintenanceStatus;
    use crate::repository::{fixture::FixtureSource, Repository};
    use std::sync::Arc;

    fn queries() -> MaintenanceQueries {
        let source = FixtureSource::in_memory().unwrap();
        let services = Services::new(Repository::new(Arc::new(source)));
        MaintenanceQueries::new(QueryClient::new(), &services)
    }

    fn status(status: MaintenanceStatus) -> StatusUpdateRequest {
        StatusUpdateRequest { status, note: None }
    }

    #[tokio::test]
    async fn test_rejected_transition_rolls_back_detail() {
        let q = queries();
        let before = q.detail("MNT-003").await.unwrap();
        assert_eq!(before.status, MaintenanceStatus::Completed);

        let err = q.update_status("MNT-003", status(MaintenanceStatus::Pending)).await.unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));

        let cached: MaintenanceRecord = q.client.get_query_data(&MAINTENANCE_KEYS.detail("MNT-003")).unwrap();
        assert_eq!(cached, before);
    }

    #[tokio::test]
    async fn test_status_change_shows_in_history_after_refetch() {
        let q = queries();
        let history = q.history("JBR-E65-01").await.unwrap();
        assert_eq!(history[0].status, MaintenanceStatus::Pending);

        q.update_status("MNT-002", status(MaintenanceStatus::InProgress)).await.unwrap();
        assert!(q.client.is_stale(&history_key("jbr-e65-01")));

        let history = q.history("JBR-E65-01").await.unwrap();
        assert_eq!(history[0].status, MaintenanceStatus::InProgress);
    }

    #[tokio::test]
    async fn test_comment_appears_after_refetch() {
        let q = queries();
        let before = q.detail("MNT-001").await.unwrap();
        let request = AddCommentRequest {
            content: "Ordered replacement keyboard".into(),
            is_internal: true,
        };
        q.add_comment("MNT-001", request).await.unwrap();

        let after = q.detail("MNT-001").await.unwrap();
        assert_eq!(after.comments.len(), before.comments.len() + 1);
    }
}
