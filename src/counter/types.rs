//! Counter domain types and the storage schema.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::store::StorePath;

/// Key used when a request names none.
pub const DEFAULT_KEY: &str = "default";

/// Logical counter namespace.
///
/// The key is used verbatim as a store path segment. It is not validated, so
/// a key containing `/` addresses a nested location in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CounterKey(String);

impl CounterKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key from an optional query value; missing or empty means [`DEFAULT_KEY`].
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => Self::new(v),
            _ => Self::new(DEFAULT_KEY),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `counters/<key>/<field>`
    pub fn field_path(&self, field: CounterField) -> StorePath {
        StorePath::new(format!("counters/{}/{}", self.0, field.as_str()))
    }

    /// `unique/<key>/<YYYY-MM-DD>/<ip>`
    pub fn marker_path(&self, day: NaiveDate, ip: &str) -> StorePath {
        StorePath::new(format!("unique/{}/{}/{}", self.0, day.format("%Y-%m-%d"), ip))
    }
}

impl Default for CounterKey {
    fn default() -> Self {
        Self::new(DEFAULT_KEY)
    }
}

impl fmt::Display for CounterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of the three documents stored per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterField {
    Total,
    Unique,
    UpdatedAt,
}

impl CounterField {
    pub fn as_str(self) -> &'static str {
        match self {
            CounterField::Total => "total",
            CounterField::Unique => "unique",
            CounterField::UpdatedAt => "updated_at",
        }
    }
}

/// Counts for one key as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub key: CounterKey,
    pub total: u64,
    pub unique: u64,
    pub total_formatted: String,
    pub unique_formatted: String,
    /// RFC 3339 timestamp of the last hit; `null` for a key never hit.
    pub updated_at: Option<String>,
}
