//! Hardware model queries

use crate::{
    cache::{fields_of, MutationSpec, QueryClient, MODEL_KEYS},
    error::AppResult,
    models::{CreateHardwareModel, HardwareModel, ModelQuery, PaginatedResponse, UpdateHardwareModel},
    services::{hardware_models::HardwareModelsService, Services},
};

#[derive(Clone)]
pub struct ModelQueries {
    client: QueryClient,
    models: HardwareModelsService,
}

impl ModelQueries {
    pub fn new(client: QueryClient, services: &Services) -> Self {
        Self {
            client,
            models: services.hardware_models.clone(),
        }
    }

    pub async fn list(&self, query: &ModelQuery) -> AppResult<PaginatedResponse<HardwareModel>> {
        self.client
            .fetch_query(MODEL_KEYS.list(query), || self.models.list(query))
            .await
    }

    pub async fn detail(&self, id: i64) -> AppResult<HardwareModel> {
        self.client
            .fetch_query(MODEL_KEYS.detail(id), || self.models.get(id))
            .await
    }

    pub async fn create(&self, data: CreateHardwareModel) -> AppResult<HardwareModel> {
        let spec = MutationSpec::new("add model", MODEL_KEYS.all()).on_success("Model added");
        self.client.mutate(spec, self.models.create(data)).await
    }

    pub async fn update(&self, id: i64, data: UpdateHardwareModel) -> AppResult<HardwareModel> {
        // specs are merged key by key server-side, a blind overwrite would drop keys
        let mut fields = fields_of(&data);
        fields.remove("specs");
        let spec = MutationSpec::new("update model", MODEL_KEYS.all())
            .merging(id, fields)
            .on_success("Model updated");
        self.client.mutate(spec, self.models.update(id, data)).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let spec = MutationSpec::new("delete model", MODEL_KEYS.all())
            .removing(id)
            .on_success("Model deleted");
        self.client.mutate(spec, self.models.delete(id)).await
    }
}
