//! Document store subsystem.
//!
//! # Data Flow
//! ```text
//! CounterService
//!     → DocumentStore (trait object)
//!         → http.rs   (GET/PUT <base>/<path>.json, ETag compare-and-swap)
//!         → memory.rs (process-local map, local runs and tests)
//! ```
//!
//! # Design Decisions
//! - Reads are total: failures and JSON `null` both mean "absent"
//! - Writes surface transport failures so the request fails loudly
//! - Counter updates go through `increment`/`insert_if_absent`, which the
//!   backends implement atomically where the store allows it

pub mod http;
pub mod memory;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::{StoreBackend, StoreConfig};

pub use http::HttpDocumentStore;
pub use memory::MemoryStore;
pub use types::{StoreError, StorePath, StoreResult};

/// Access to a JSON document store addressed by slash-delimited paths.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the value at `path`. Missing, `null` and unreadable values are `None`.
    async fn get(&self, path: &StorePath) -> Option<Value>;

    /// Write `value` at `path`, replacing what was there.
    async fn put(&self, path: &StorePath, value: &Value) -> StoreResult<()>;

    /// Add `delta` to the counter at `path` and return the new value.
    ///
    /// A missing or non-numeric value counts as zero.
    async fn increment(&self, path: &StorePath, delta: u64) -> StoreResult<u64>;

    /// Write `value` at `path` only if nothing is stored there yet.
    ///
    /// Returns `true` when this call created the value.
    async fn insert_if_absent(&self, path: &StorePath, value: &Value) -> StoreResult<bool>;
}

/// Build the store selected by the configuration.
pub fn build_store(config: &StoreConfig) -> StoreResult<Arc<dyn DocumentStore>> {
    match config.backend {
        StoreBackend::Http => Ok(Arc::new(HttpDocumentStore::new(config)?)),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; counts are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Interpret a stored JSON value as a counter.
pub fn count_value(value: Option<&Value>) -> u64 {
    value
        .and_then(|v| {
            v.as_u64().or_else(|| {
                v.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f as u64)
            })
        })
        .unwrap_or(0)
}
