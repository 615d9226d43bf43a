//! Process-local document store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::{json, Value};

use crate::store::types::{StoreError, StorePath, StoreResult};
use crate::store::{count_value, DocumentStore};

/// A thread-safe in-memory document store.
///
/// Updates to a single path are atomic (DashMap shard locking), so the
/// counter semantics match a store with working compare-and-swap.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, Value>>,
    offline: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: reads come back absent and writes fail.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Raw value at `path`, bypassing the outage switch.
    pub fn value(&self, path: &str) -> Option<Value> {
        self.inner.get(path).map(|r| r.value().clone())
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn check_online(&self, path: &StorePath) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("memory store offline, write to '{}' refused", path)));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &StorePath) -> Option<Value> {
        if self.offline.load(Ordering::SeqCst) {
            return None;
        }
        self.inner
            .get(path.as_str())
            .map(|r| r.value().clone())
            .filter(|v| !v.is_null())
    }

    async fn put(&self, path: &StorePath, value: &Value) -> StoreResult<()> {
        self.check_online(path)?;
        // Writing null deletes, as the remote store does
        if value.is_null() {
            self.inner.remove(path.as_str());
        } else {
            self.inner.insert(path.as_str().to_string(), value.clone());
        }
        Ok(())
    }

    async fn increment(&self, path: &StorePath, delta: u64) -> StoreResult<u64> {
        self.check_online(path)?;
        let mut entry = self.inner.entry(path.as_str().to_string()).or_insert(json!(0));
        let next = count_value(Some(entry.value())).saturating_add(delta);
        *entry.value_mut() = json!(next);
        Ok(next)
    }

    async fn insert_if_absent(&self, path: &StorePath, value: &Value) -> StoreResult<bool> {
        self.check_online(path)?;
        match self.inner.entry(path.as_str().to_string()) {
            Entry::Occupied(entry) if !entry.get().is_null() => Ok(false),
            Entry::Occupied(mut entry) => {
                entry.insert(value.clone());
                Ok(true)
            }
            Entry::Vacant(entry) => {
                entry.insert(value.clone());
                Ok(true)
            }
        }
    }
}
