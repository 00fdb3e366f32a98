//! Cache-backed reads and mutations per entity
//!
//! Reads go through [`QueryClient::fetch_query`] under the entity's key factory.
//! Mutations on an existing record patch the cache optimistically; creates only
//! invalidate since the record has no id until the server answers.

pub mod assets;
pub mod employees;
pub mod invoices;
pub mod maintenance;
pub mod models;

use crate::{cache::QueryClient, services::Services};

pub use assets::AssetQueries;
pub use employees::EmployeeQueries;
pub use invoices::InvoiceQueries;
pub use maintenance::MaintenanceQueries;
pub use models::ModelQueries;

/// Every entity's queries over one shared cache
#[derive(Clone)]
pub struct Queries {
    pub client: QueryClient,
    pub assets: AssetQueries,
    pub employees: EmployeeQueries,
    pub maintenance: MaintenanceQueries,
    pub models: ModelQueries,
    pub invoices: InvoiceQueries,
}

impl Queries {
    pub fn new(services: &Services) -> Self {
        let client = QueryClient::new();
        Self {
            assets: AssetQueries::new(client.clone(), services),
            employees: EmployeeQueries::new(client.clone(), services),
            maintenance: MaintenanceQueries::new(client.clone(), services),
            models: ModelQueries::new(client.clone(), services),
            invoices: InvoiceQueries::new(client.clone(), services),
            client,
        }
    }
}
