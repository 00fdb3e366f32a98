//! HTTP-backed data source talking to the REST backend.
//!
//! Endpoints live under `{base_url}/api`. Lists are requested with their filters as
//! query parameters (unset filters are omitted) and come back in the
//! `{data, pagination}` envelope. Non-2xx answers are decoded from the
//! `{error: {code, message, details}}` envelope when possible. Nothing is retried.

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::debug;

use super::DataSource;
use crate::{
    config::ApiConfig,
    error::{AppError, AppResult, ErrorResponse},
    models::{
        Asset, AssetQuery, CreateAsset, CreateEmployee, CreateHardwareModel, CreateInvoice,
        CreateMaintenance, Employee, EmployeeQuery, HardwareModel, Invoice, InvoiceQuery,
        MaintenanceQuery, MaintenanceRecord, ModelQuery, PaginatedResponse, UpdateAsset,
        UpdateEmployee, UpdateHardwareModel, UpdateInvoice, UpdateMaintenance,
    },
};

const USER_AGENT_VALUE: &str = concat!("assetdesk/", env!("CARGO_PKG_VERSION"));

/// REST client implementing [`DataSource`]
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
    log_requests: bool,
}

impl HttpSource {
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(USER_AGENT_VALUE)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone().filter(|t| !t.is_empty()),
            log_requests: config.enable_logging,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/api{}", self.base_url, endpoint)
    }

    /// URL of one record, with `id` percent-encoded as a single path segment
    fn item_url(&self, collection: &str, id: impl ToString) -> AppResult<String> {
        let mut url = Url::parse(&self.url(collection))
            .map_err(|e| AppError::Internal(format!("invalid API URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Internal(format!("API base URL cannot carry a path: {}", self.base_url)))?
            .pop_if_empty()
            .push(&id.to_string());
        Ok(url.into())
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        if self.log_requests {
            debug!(method = %method, url = %url, "api request");
        }
        let mut request = self.client.request(method, url);
        if let Some(token) = &self.access_token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        request
    }

    async fn send(&self, request: RequestBuilder) -> AppResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if self.log_requests {
            debug!(status = status.as_u16(), url = %response.url(), "api response");
        }
        if status.is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: String) -> AppResult<T> {
        let response = self.send(self.request(Method::GET, url)).await?;
        Ok(response.json().await?)
    }

    async fn get_with_query<T, Q>(&self, endpoint: &str, query: &Q) -> AppResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self
            .send(self.request(Method::GET, self.url(endpoint)).query(query))
            .await?;
        Ok(response.json().await?)
    }

    async fn send_json<T, B>(&self, method: Method, url: String, body: &B) -> AppResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send(self.request(method, url).json(body)).await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, url: String) -> AppResult<()> {
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}

/// Decode a non-2xx response into [`AppError::Api`]
async fn error_from_response(response: Response) -> AppError {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return AppError::Api {
            status: 401,
            code: Some("UNAUTHORIZED".to_string()),
            message: "Unauthorized".to_string(),
            details: None,
        };
    }

    let fallback = format!(
        "HTTP {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown Status")
    );
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(envelope) => AppError::Api {
            status: status.as_u16(),
            code: Some(envelope.error.code).filter(|c| !c.is_empty()),
            message: if envelope.error.message.is_empty() {
                fallback
            } else {
                envelope.error.message
            },
            details: envelope.error.details,
        },
        Err(_) => AppError::Api {
            status: status.as_u16(),
            code: None,
            message: fallback,
            details: None,
        },
    }
}

#[async_trait]
impl DataSource for HttpSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn assets_list(&self, query: &AssetQuery) -> AppResult<PaginatedResponse<Asset>> {
        self.get_with_query("/assets", query).await
    }

    async fn assets_get(&self, id: i64) -> AppResult<Asset> {
        self.get(self.item_url("/assets", id)?).await
    }

    async fn assets_create(&self, data: CreateAsset) -> AppResult<Asset> {
        self.send_json(Method::POST, self.url("/assets"), &data).await
    }

    async fn assets_update(&self, id: i64, data: UpdateAsset) -> AppResult<Asset> {
        self.send_json(Method::PUT, self.item_url("/assets", id)?, &data).await
    }

    async fn assets_delete(&self, id: i64) -> AppResult<()> {
        self.delete(self.item_url("/assets", id)?).await
    }

    async fn employees_list(&self, query: &EmployeeQuery) -> AppResult<PaginatedResponse<Employee>> {
        self.get_with_query("/employees", query).await
    }

    async fn employees_get(&self, id: &str) -> AppResult<Employee> {
        self.get(self.item_url("/employees", id)?).await
    }

    async fn employees_create(&self, data: CreateEmployee) -> AppResult<Employee> {
        self.send_json(Method::POST, self.url("/employees"), &data).await
    }

    async fn employees_update(&self, id: &str, data: UpdateEmployee) -> AppResult<Employee> {
        self.send_json(Method::PUT, self.item_url("/employees", id)?, &data).await
    }

    async fn employees_delete(&self, id: &str) -> AppResult<()> {
        self.delete(self.item_url("/employees", id)?).await
    }

    async fn maintenance_list(&self, query: &MaintenanceQuery) -> AppResult<PaginatedResponse<MaintenanceRecord>> {
        self.get_with_query("/maintenance", query).await
    }

    async fn maintenance_get(&self, id: &str) -> AppResult<MaintenanceRecord> {
        self.get(self.item_url("/maintenance", id)?).await
    }

    async fn maintenance_create(&self, data: CreateMaintenance) -> AppResult<MaintenanceRecord> {
        self.send_json(Method::POST, self.url("/maintenance"), &data).await
    }

    async fn maintenance_update(&self, id: &str, data: UpdateMaintenance) -> AppResult<MaintenanceRecord> {
        self.send_json(Method::PUT, self.item_url("/maintenance", id)?, &data).await
    }

    async fn maintenance_delete(&self, id: &str) -> AppResult<()> {
        self.delete(self.item_url("/maintenance", id)?).await
    }

    async fn models_list(&self, query: &ModelQuery) -> AppResult<PaginatedResponse<HardwareModel>> {
        self.get_with_query("/models", query).await
    }

    async fn models_get(&self, id: i64) -> AppResult<HardwareModel> {
        self.get(self.item_url("/models", id)?).await
    }

    async fn models_create(&self, data: CreateHardwareModel) -> AppResult<HardwareModel> {
        self.send_json(Method::POST, self.url("/models"), &data).await
    }

    async fn models_update(&self, id: i64, data: UpdateHardwareModel) -> AppResult<HardwareModel> {
        self.send_json(Method::PUT, self.item_url("/models", id)?, &data).await
    }

    async fn models_delete(&self, id: i64) -> AppResult<()> {
        self.delete(self.item_url("/models", id)?).await
    }

    async fn invoices_list(&self, query: &InvoiceQuery) -> AppResult<PaginatedResponse<Invoice>> {
        self.get_with_query("/invoices", query).await
    }

    async fn invoices_get(&self, id: i64) -> AppResult<Invoice> {
        self.get(self.item_url("/invoices", id)?).await
    }

    async fn invoices_create(&self, data: CreateInvoice) -> AppResult<Invoice> {
        self.send_json(Method::POST, self.url("/invoices"), &data).await
    }

    async fn invoices_update(&self, id: i64, data: UpdateInvoice) -> AppResult<Invoice> {
        self.send_json(Method::PUT, self.item_url("/invoices", id)?, &data).await
    }

    async fn invoices_delete(&self, id: i64) -> AppResult<()> {
        self.delete(self.item_url("/invoices", id)?).await
    }
}
