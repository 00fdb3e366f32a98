//! Key-value document store backing the fixture data source.
//!
//! Every key holds one JSON document (an array of records). The store lives either
//! in memory or in a directory with one `<key>.json` file per key.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};

static KEY_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_\-]{1,64}$").unwrap());

enum Backend {
    Memory(RwLock<HashMap<String, String>>),
    Directory(PathBuf),
}

/// JSON document store keyed by name
pub struct KeyValueStore {
    backend: Backend,
}

impl KeyValueStore {
    /// Volatile store, lost with the process
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(RwLock::new(HashMap::new())),
        }
    }

    /// Store persisted under `dir`, created when missing
    pub async fn open_dir(dir: impl AsRef<Path>) -> AppResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        tracing::info!("Key-value store at {}", dir.display());
        Ok(Self {
            backend: Backend::Directory(dir),
        })
    }

    fn path_for(dir: &Path, key: &str) -> PathBuf {
        dir.join(format!("{}.json", key))
    }

    fn check_key(key: &str) -> AppResult<()> {
        if KEY_PATTERN.is_match(key) {
            Ok(())
        } else {
            Err(AppError::Storage(format!("Invalid storage key '{}'", key)))
        }
    }

    /// Raw document stored under `key`
    pub async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Self::check_key(key)?;
        match &self.backend {
            Backend::Memory(map) => Ok(map.read().await.get(key).cloned()),
            Backend::Directory(dir) => match tokio::fs::read_to_string(Self::path_for(dir, key)).await {
                Ok(raw) => Ok(Some(raw)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            },
        }
    }

    pub async fn set(&self, key: &str, raw: String) -> AppResult<()> {
        Self::check_key(key)?;
        match &self.backend {
            Backend::Memory(map) => {
                map.write().await.insert(key.to_string(), raw);
                Ok(())
            }
            Backend::Directory(dir) => {
                // write-then-rename so readers never see a torn document
                let target = Self::path_for(dir, key);
                let tmp = dir.join(format!(".{}.json.tmp", key));
                tokio::fs::write(&tmp, raw).await?;
                tokio::fs::rename(&tmp, &target).await?;
                Ok(())
            }
        }
    }

    /// Delete `key`; returns whether something was stored there
    pub async fn remove(&self, key: &str) -> AppResult<bool> {
        Self::check_key(key)?;
        match &self.backend {
            Backend::Memory(map) => Ok(map.write().await.remove(key).is_some()),
            Backend::Directory(dir) => match tokio::fs::remove_file(Self::path_for(dir, key)).await {
                Ok(()) => Ok(true),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
                Err(e) => Err(e.into()),
            },
        }
    }

    /// Drop every key
    pub async fn clear(&self) -> AppResult<()> {
        match &self.backend {
            Backend::Memory(map) => {
                map.write().await.clear();
                Ok(())
            }
            Backend::Directory(dir) => {
                let mut entries = tokio::fs::read_dir(dir).await?;
                while let Some(entry) = entries.next_entry().await? {
                    let path = entry.path();
                    if path.extension().is_some_and(|ext| ext == "json") {
                        tokio::fs::remove_file(path).await?;
                    }
                }
                Ok(())
            }
        }
    }

    /// Typed records stored under `key`
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<Vec<T>>> {
        match self.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn save<T: Serialize>(&self, key: &str, items: &[T]) -> AppResult<()> {
        let raw = serde_json::to_string(items)?;
        self.set(key, raw).await
    }

    /// Stored records for `key`, or `default` after persisting it.
    ///
    /// A document that no longer parses is logged and replaced by `default`; a
    /// failure to read it at all is returned as is.
    pub async fn initialize<T>(&self, key: &str, default: Vec<T>) -> AppResult<Vec<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        if let Some(raw) = self.get(key).await? {
            match serde_json::from_str(&raw) {
                Ok(items) => return Ok(items),
                Err(e) => tracing::warn!("Discarding unreadable data for '{}': {}", key, e),
            }
        }
        self.save(key, &default).await?;
        Ok(default)
    }
}
