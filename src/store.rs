//! Persistence of the derived views.
//!
//! The engine only needs a synchronous key-value store for JSON values.
//! [`ClusterCache`] puts the four typed slots on top of it.
use crate::error::StoreError;
use crate::structs::{AssetIndexItem, MomentCluster, PlaceCluster};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub const ASSET_INDEX_KEY: &str = "photoClusters.assetIndex.v1";
pub const MOMENTS_KEY: &str = "photoClusters.moments.v1";
pub const PLACES_KEY: &str = "photoClusters.places.v1";
pub const LAST_SYNC_TS_KEY: &str = "photoClusters.lastSyncTs.v1";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Keeps every key as `<key>.json` inside one directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let bytes = match std::fs::read(self.path_for(key)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Serde {
                key: key.to_string(),
                source,
            })
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(&value).map_err(|source| StoreError::Serde {
            key: key.to_string(),
            source,
        })?;
        std::fs::write(self.path_for(key), bytes)?;
        Ok(())
    }
}

/// Typed access to the four persisted slots: asset index, moments, places and
/// last sync time.
///
/// Reads never fail: a missing, unreadable or corrupt slot reads as empty.
#[derive(Clone)]
pub struct ClusterCache {
    store: Arc<dyn KeyValueStore>,
}

impl ClusterCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = match self.store.get(key) {
            Ok(value) => value?,
            Err(e) => {
                tracing::warn!("Could not read {key} from cache: {e}");
                return None;
            }
        };
        match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Ignoring corrupt cache entry {key}: {e}");
                None
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_value(value).map_err(|source| StoreError::Serde {
            key: key.to_string(),
            source,
        })?;
        self.store.set(key, json)
    }

    pub fn asset_index(&self) -> Vec<AssetIndexItem> {
        self.read(ASSET_INDEX_KEY).unwrap_or_default()
    }

    pub fn moments(&self) -> Vec<MomentCluster> {
        self.read(MOMENTS_KEY).unwrap_or_default()
    }

    pub fn places(&self) -> Vec<PlaceCluster> {
        self.read(PLACES_KEY).unwrap_or_default()
    }

    pub fn last_sync_ts(&self) -> Option<i64> {
        self.read(LAST_SYNC_TS_KEY)
    }

    pub fn save_asset_index(&self, items: &[AssetIndexItem]) -> Result<(), StoreError> {
        self.write(ASSET_INDEX_KEY, &items)
    }

    /// Writes index, moments and sync time back to back.
    pub fn save_moments(
        &self,
        items: &[AssetIndexItem],
        moments: &[MomentCluster],
        last_sync_ts: i64,
    ) -> Result<(), StoreError> {
        self.write(ASSET_INDEX_KEY, &items)?;
        self.write(MOMENTS_KEY, &moments)?;
        self.write(LAST_SYNC_TS_KEY, &last_sync_ts)
    }

    /// Writes places and sync time back to back.
    pub fn save_places(&self, places: &[PlaceCluster], last_sync_ts: i64) -> Result<(), StoreError> {
        self.write(PLACES_KEY, &places)?;
        self.write(LAST_SYNC_TS_KEY, &last_sync_ts)
    }
}
