//! Query cache and optimistic mutation support

pub mod client;
pub mod keys;
pub mod mutation;
pub mod notify;

pub use client::{CacheEvent, CacheSnapshot, QueryClient};
pub use keys::{
    KeyFactory, QueryKey, ASSET_KEYS, EMPLOYEE_KEYS, INVOICE_KEYS, MAINTENANCE_KEYS, MODEL_KEYS,
};
pub use mutation::{fields_of, patch_record, remove_record, MutationSpec};
pub use notify::{Notification, NotificationLevel};
