//! Assetdesk IT asset management
//!
//! Data layer and REST server for an IT asset inventory: assets, employees,
//! maintenance tickets, hardware models and purchase invoices. Records come from a
//! fixture-backed key-value store or a remote REST backend, behind the same
//! [`repository::DataSource`] trait. [`cache`] and [`queries`] add a client-side
//! query cache with optimistic mutations.

use std::sync::Arc;

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod queries;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(config: AppConfig, services: services::Services) -> Self {
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
