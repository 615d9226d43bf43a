//! Counter read and hit recording against the document store.

use std::sync::Arc;

use chrono::{NaiveDate, SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::counter::format::format_count;
use crate::counter::types::{CounterField, CounterKey, CounterSnapshot};
use crate::observability::metrics;
use crate::store::{count_value, DocumentStore, StoreResult};

/// Counter operations over a shared document store.
#[derive(Clone)]
pub struct CounterService {
    store: Arc<dyn DocumentStore>,
}

impl CounterService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Read the current counts for `key`. Never fails: unreadable documents
    /// count as zero, or as a `null` timestamp.
    pub async fn get_counts(&self, key: &CounterKey) -> CounterSnapshot {
        let total = count_value(self.store.get(&key.field_path(CounterField::Total)).await.as_ref());
        let unique = count_value(self.store.get(&key.field_path(CounterField::Unique)).await.as_ref());
        let updated_at = match self.store.get(&key.field_path(CounterField::UpdatedAt)).await {
            Some(Value::String(ts)) => Some(ts),
            Some(other) => {
                tracing::debug!(key = %key, value = %other, "Ignoring non-string updated_at");
                None
            }
            None => None,
        };

        CounterSnapshot {
            key: key.clone(),
            total,
            unique,
            total_formatted: format_count(total),
            unique_formatted: format_count(unique),
            updated_at,
        }
    }

    /// Record one hit on `key` from `ip` and return the fresh counts.
    ///
    /// With `unique_mode` the unique count grows only for the first hit of an
    /// IP on `today`; without it every hit counts as unique.
    pub async fn record_hit(
        &self,
        key: &CounterKey,
        ip: &str,
        unique_mode: bool,
        today: NaiveDate,
    ) -> StoreResult<CounterSnapshot> {
        let unique_increment = if unique_mode {
            let marker = key.marker_path(today, ip);
            if self.store.insert_if_absent(&marker, &Value::Bool(true)).await? {
                1
            } else {
                0
            }
        } else {
            1
        };

        let total = self.store.increment(&key.field_path(CounterField::Total), 1).await?;
        let unique = self
            .store
            .increment(&key.field_path(CounterField::Unique), unique_increment)
            .await?;

        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        self.store
            .put(&key.field_path(CounterField::UpdatedAt), &json!(now))
            .await?;

        metrics::record_hit(unique_increment == 1);
        tracing::debug!(
            key = %key,
            ip = %ip,
            unique_mode,
            total,
            unique,
            "Hit recorded"
        );

        Ok(self.get_counts(key).await)
    }
}
