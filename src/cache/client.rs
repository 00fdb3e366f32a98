//! Client-side query cache
//!
//! Entries hold server-shaped JSON (list envelopes and single records) under a
//! [`QueryKey`]. Each entry carries a generation number: cancelling, invalidating,
//! restoring or removing an entry bumps it, and a fetch that completes under an
//! older generation is discarded with [`AppError::Cancelled`] instead of being
//! written. The lock is never held across an await point.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

use super::keys::QueryKey;
use super::notify::Notification;
use crate::error::{AppError, AppResult};

const EVENT_CAPACITY: usize = 64;

/// Change feed of the cache
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEvent {
    /// Fresh data was written under the key
    Updated(QueryKey),
    /// Every entry under the prefix went stale
    Invalidated(QueryKey),
    /// Entries under the prefix were put back to a snapshot
    RolledBack(QueryKey),
    Notify(Notification),
}

#[derive(Debug, Clone, Default)]
struct Entry {
    data: Option<Value>,
    generation: u64,
    stale: bool,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: BTreeMap<QueryKey, Entry>,
    /// Prefixes held by pending optimistic mutations
    held: Vec<QueryKey>,
    next_generation: u64,
}

impl CacheState {
    fn bump(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// Entry under `key`, created with a fresh generation when missing so a fetch
    /// begun before the key was removed cannot write into its replacement.
    fn entry_mut(&mut self, key: &QueryKey) -> &mut Entry {
        let Self {
            entries,
            next_generation,
            ..
        } = self;
        entries.entry(key.clone()).or_insert_with(|| {
            *next_generation += 1;
            Entry {
                generation: *next_generation,
                ..Entry::default()
            }
        })
    }

    fn keys_under(&self, prefix: &QueryKey) -> Vec<QueryKey> {
        self.entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn is_held(&self, key: &QueryKey) -> bool {
        self.held.iter().any(|prefix| key.starts_with(prefix))
    }
}

/// Cached data of every entry under a prefix, taken for rollback
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSnapshot {
    prefix: QueryKey,
    entries: BTreeMap<QueryKey, Value>,
}

impl CacheSnapshot {
    pub fn prefix(&self) -> &QueryKey {
        &self.prefix
    }

    pub fn get(&self, key: &QueryKey) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Shared handle on the cache; clones see the same entries
#[derive(Clone)]
pub struct QueryClient {
    state: Arc<Mutex<CacheState>>,
    events: broadcast::Sender<CacheEvent>,
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryClient {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(CacheState::default())),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn emit(&self, event: CacheEvent) {
        // no subscriber is fine
        let _ = self.events.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Cached value when it is fresh (or held by a pending mutation), else `fetcher`.
    ///
    /// The fetched value is written only if the entry was not cancelled,
    /// invalidated or restored while the fetch was in flight.
    pub async fn fetch_query<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let generation = {
            let mut state = self.lock();
            let held = state.is_held(&key);
            let entry = state.entry_mut(&key);
            if let Some(data) = &entry.data {
                if !entry.stale || held {
                    return Ok(serde_json::from_value(data.clone())?);
                }
            }
            entry.generation
        };

        let value = fetcher().await?;
        let json = serde_json::to_value(&value)?;

        {
            let mut state = self.lock();
            match state.entries.get_mut(&key) {
                Some(entry) if entry.generation == generation => {
                    entry.data = Some(json);
                    entry.stale = false;
                    entry.updated_at = Some(Utc::now());
                }
                _ => {
                    tracing::debug!(key = %key, "discarding superseded fetch");
                    return Err(AppError::Cancelled);
                }
            }
        }
        self.emit(CacheEvent::Updated(key));
        Ok(value)
    }

    pub fn get_query_data<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let state = self.lock();
        let data = state.entries.get(key)?.data.clone()?;
        serde_json::from_value(data).ok()
    }

    /// Raw cached JSON under `key`
    pub fn get_raw(&self, key: &QueryKey) -> Option<Value> {
        self.lock().entries.get(key).and_then(|e| e.data.clone())
    }

    pub fn set_query_data<T: Serialize + ?Sized>(&self, key: QueryKey, data: &T) -> AppResult<()> {
        let json = serde_json::to_value(data)?;
        {
            let mut state = self.lock();
            let entry = state.entry_mut(&key);
            entry.data = Some(json);
            entry.stale = false;
            entry.updated_at = Some(Utc::now());
        }
        self.emit(CacheEvent::Updated(key));
        Ok(())
    }

    /// Apply `patch` to every cached value under `prefix`; returns how many
    /// entries reported a change.
    pub fn set_queries_data<F>(&self, prefix: &QueryKey, mut patch: F) -> usize
    where
        F: FnMut(&QueryKey, &mut Value) -> bool,
    {
        let changed: Vec<QueryKey> = {
            let mut state = self.lock();
            state
                .entries
                .iter_mut()
                .filter(|(key, _)| key.starts_with(prefix))
                .filter_map(|(key, entry)| {
                    let data = entry.data.as_mut()?;
                    patch(key, data).then(|| key.clone())
                })
                .collect()
        };
        for key in &changed {
            self.emit(CacheEvent::Updated(key.clone()));
        }
        changed.len()
    }

    /// Abandon in-flight fetches under `prefix`; cached data is kept.
    pub fn cancel_queries(&self, prefix: &QueryKey) -> usize {
        let mut state = self.lock();
        let keys = state.keys_under(prefix);
        for key in &keys {
            let generation = state.bump();
            if let Some(entry) = state.entries.get_mut(key) {
                entry.generation = generation;
            }
        }
        keys.len()
    }

    /// Mark everything under `prefix` stale so the next read refetches.
    pub fn invalidate_queries(&self, prefix: &QueryKey) -> usize {
        let count = {
            let mut state = self.lock();
            let keys = state.keys_under(prefix);
            for key in &keys {
                let generation = state.bump();
                if let Some(entry) = state.entries.get_mut(key) {
                    entry.generation = generation;
                    entry.stale = true;
                }
            }
            keys.len()
        };
        self.emit(CacheEvent::Invalidated(prefix.clone()));
        count
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.lock().entries.get(key).map_or(true, |e| e.stale || e.data.is_none())
    }

    pub fn updated_at(&self, key: &QueryKey) -> Option<DateTime<Utc>> {
        self.lock().entries.get(key).and_then(|e| e.updated_at)
    }

    pub fn snapshot(&self, prefix: &QueryKey) -> CacheSnapshot {
        let state = self.lock();
        CacheSnapshot {
            prefix: prefix.clone(),
            entries: state
                .entries
                .iter()
                .filter(|(key, _)| key.starts_with(prefix))
                .filter_map(|(key, entry)| Some((key.clone(), entry.data.clone()?)))
                .collect(),
        }
    }

    /// Put the cached data under the snapshot prefix back exactly as it was.
    ///
    /// Data written under the prefix after the snapshot was taken is dropped.
    pub fn restore(&self, snapshot: CacheSnapshot) {
        {
            let mut state = self.lock();
            let keys = state.keys_under(&snapshot.prefix);
            for key in keys {
                let generation = state.bump();
                if let Some(entry) = state.entries.get_mut(&key) {
                    entry.generation = generation;
                    entry.data = snapshot.entries.get(&key).cloned();
                }
            }
            for (key, data) in &snapshot.entries {
                if !state.entries.contains_key(key) {
                    let generation = state.bump();
                    state.entries.insert(
                        key.clone(),
                        Entry {
                            data: Some(data.clone()),
                            generation,
                            stale: false,
                            updated_at: Some(Utc::now()),
                        },
                    );
                }
            }
        }
        self.emit(CacheEvent::RolledBack(snapshot.prefix));
    }

    pub fn remove_queries(&self, prefix: &QueryKey) -> usize {
        let mut state = self.lock();
        let keys = state.keys_under(prefix);
        for key in &keys {
            state.entries.remove(key);
        }
        keys.len()
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    pub(crate) fn hold(&self, prefix: &QueryKey) {
        self.lock().held.push(prefix.clone());
    }

    pub(crate) fn release(&self, prefix: &QueryKey) {
        let mut state = self.lock();
        if let Some(pos) = state.held.iter().position(|k| k == prefix) {
            state.held.remove(pos);
        }
    }
}
