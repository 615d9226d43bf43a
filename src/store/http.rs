//! Remote JSON document store client.
//!
//! # Responsibilities
//! - Map store paths onto `<base-url>/<path>.json`
//! - Read values, coercing every failure to "absent"
//! - Write values, surfacing transport failures
//! - Compare-and-swap counter updates via the store's ETag protocol
//!
//! # Protocol
//! ```text
//! GET  <base>/<path>.json                       → 200 <json> | 200 null | 4xx/5xx
//! GET  <base>/<path>.json  X-Firebase-ETag: true → ETag: <tag>
//! PUT  <base>/<path>.json  if-match: <tag>       → 200 | 412 Precondition Failed
//! ```
//!
//! A store that never sends an ETag gets plain read-then-put updates.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ETAG, IF_MATCH};
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::config::StoreConfig;
use crate::observability::metrics;
use crate::resilience::BackoffPolicy;
use crate::store::types::{StoreError, StorePath, StoreResult};
use crate::store::{count_value, DocumentStore};

/// Request header asking the store to return an ETag with the value.
pub const ETAG_REQUEST_HEADER: &str = "X-Firebase-ETag";

/// A value read from the store together with its version tag.
#[derive(Debug, Default)]
struct Versioned {
    value: Option<Value>,
    etag: Option<String>,
}

/// Outcome of a read-modify-write decision.
enum Update<T> {
    /// Store this value, then return the result.
    Write(Value, T),
    /// Leave the stored value untouched.
    Keep(T),
}

/// HTTP client for the remote document store.
#[derive(Clone)]
pub struct HttpDocumentStore {
    client: reqwest::Client,
    /// Normalized base URL, always ending in `/`.
    base_url: String,
    backoff: BackoffPolicy,
    config: StoreConfig,
}

impl HttpDocumentStore {
    /// Create a new store client.
    pub fn new(config: &StoreConfig) -> StoreResult<Self> {
        let mut base_url = config.base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        url::Url::parse(&base_url).map_err(|e| {
            StoreError::Client(format!("invalid store URL '{}': {}", config.base_url, e))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("hit-counter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StoreError::Client(e.to_string()))?;

        tracing::info!(
            base_url = %base_url,
            timeout_secs = config.timeout_secs,
            conditional_writes = config.conditional_writes,
            "Store client initialized"
        );

        Ok(Self {
            client,
            base_url,
            backoff: BackoffPolicy::from(config),
            config: config.clone(),
        })
    }

    /// Full URL of the document at `path`.
    pub fn url_for(&self, path: &StorePath) -> String {
        format!("{}{}.json", self.base_url, path)
    }

    fn transport_error(&self, path: &StorePath, e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Timeout {
                path: path.to_string(),
                secs: self.config.timeout_secs,
            }
        } else {
            StoreError::Transport {
                path: path.to_string(),
                source: e,
            }
        }
    }

    async fn read(&self, path: &StorePath, with_etag: bool) -> StoreResult<Versioned> {
        let mut request = self.client.get(self.url_for(path));
        if with_etag {
            request = request.header(ETAG_REQUEST_HEADER, "true");
        }

        let response = request.send().await.map_err(|e| self.transport_error(path, e))?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(path = %path, status = %status, "Store read returned non-success, treating as absent");
            metrics::record_store_call("get", "absent");
            return Ok(Versioned::default());
        }

        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(|e| self.transport_error(path, e))?;
        let value = parse_body(path, &body);

        metrics::record_store_call("get", if value.is_some() { "ok" } else { "absent" });
        Ok(Versioned { value, etag })
    }

    /// PUT guarded by `if-match`. Returns `false` when another writer won.
    async fn put_if_match(&self, path: &StorePath, value: &Value, etag: &str) -> StoreResult<bool> {
        let response = self
            .client
            .put(self.url_for(path))
            .header(IF_MATCH, etag)
            .json(value)
            .send()
            .await
            .map_err(|e| {
                metrics::record_store_call("put", "error");
                self.transport_error(path, e)
            })?;

        let status = response.status();
        if status == StatusCode::PRECONDITION_FAILED {
            metrics::record_store_call("put", "conflict");
            return Ok(false);
        }
        if !status.is_success() {
            tracing::warn!(path = %path, status = %status, "Store rejected conditional write");
            metrics::record_store_call("put", "rejected");
        } else {
            metrics::record_store_call("put", "ok");
        }
        Ok(true)
    }

    async fn apply_unconditionally<T>(&self, path: &StorePath, update: Update<T>) -> StoreResult<T> {
        match update {
            Update::Keep(result) => Ok(result),
            Update::Write(value, result) => {
                self.put(path, &value).await?;
                Ok(result)
            }
        }
    }

    /// Read-modify-write loop over the store's ETag compare-and-swap.
    async fn update<T, F>(&self, path: &StorePath, mut decide: F) -> StoreResult<T>
    where
        F: FnMut(Option<&Value>) -> Update<T>,
    {
        if !self.config.conditional_writes {
            let current = self.get(path).await;
            return self.apply_unconditionally(path, decide(current.as_ref())).await;
        }

        let max_attempts = self.config.max_update_attempts;
        for attempt in 1..=max_attempts {
            let current = self.read(path, true).await?;
            let etag = match current.etag {
                Some(etag) => etag,
                None => {
                    tracing::debug!(path = %path, "Store returned no ETag, writing unconditionally");
                    return self.apply_unconditionally(path, decide(current.value.as_ref())).await;
                }
            };

            match decide(current.value.as_ref()) {
                Update::Keep(result) => return Ok(result),
                Update::Write(value, result) => {
                    if self.put_if_match(path, &value, &etag).await? {
                        return Ok(result);
                    }
                    metrics::record_store_conflict();
                    if attempt < max_attempts {
                        let delay = self.backoff.delay(attempt);
                        tracing::debug!(path = %path, attempt, delay = ?delay, "Conditional write conflicted, retrying");
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        tracing::warn!(path = %path, attempts = max_attempts, "Giving up on contended update");
        Err(StoreError::Contention {
            path: path.to_string(),
            attempts: max_attempts,
        })
    }
}

impl std::fmt::Debug for HttpDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDocumentStore")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.config.timeout_secs)
            .field("conditional_writes", &self.config.conditional_writes)
            .finish()
    }
}

/// Decode a response body; `null`, empty and malformed bodies are absent.
fn parse_body(path: &StorePath, body: &str) -> Option<Value> {
    let body = body.trim();
    if body.is_empty() || body == "null" {
        return None;
    }
    match serde_json::from_str::<Value>(body) {
        Ok(value) if value.is_null() => None,
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Store returned malformed JSON, treating as absent");
            None
        }
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn get(&self, path: &StorePath) -> Option<Value> {
        match self.read(path, false).await {
            Ok(versioned) => versioned.value,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Store read failed, treating as absent");
                metrics::record_store_call("get", "error");
                None
            }
        }
    }

    async fn put(&self, path: &StorePath, value: &Value) -> StoreResult<()> {
        let response = self
            .client
            .put(self.url_for(path))
            .json(value)
            .send()
            .await
            .map_err(|e| {
                metrics::record_store_call("put", "error");
                self.transport_error(path, e)
            })?;

        // The write is not verified beyond logging
        let status = response.status();
        if status.is_success() {
            metrics::record_store_call("put", "ok");
        } else {
            tracing::warn!(path = %path, status = %status, "Store rejected write");
            metrics::record_store_call("put", "rejected");
        }
        Ok(())
    }

    async fn increment(&self, path: &StorePath, delta: u64) -> StoreResult<u64> {
        self.update(path, |current: Option<&Value>| {
            let next = count_value(current).saturating_add(delta);
            Update::Write(json!(next), next)
        })
        .await
    }

    async fn insert_if_absent(&self, path: &StorePath, value: &Value) -> StoreResult<bool> {
        self.update(path, |current: Option<&Value>| match current {
            Some(_) => Update::Keep(false),
            None => Update::Write(value.clone(), true),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_config(base_url: &str) -> StoreConfig {
        StoreConfig {
            base_url: base_url.to_string(),
            ..StoreConfig::default()
        }
    }

    #[test]
    fn test_url_for_adds_slash_and_suffix() {
        let store = HttpDocumentStore::new(&store_config("https://demo.firebaseio.com")).unwrap();
        let path = StorePath::new("counters/blog/total");
        assert_eq!(store.url_for(&path), "https://demo.firebaseio.com/counters/blog/total.json");

        let store = HttpDocumentStore::new(&store_config("https://demo.firebaseio.com/root/")).unwrap();
        assert_eq!(store.url_for(&path), "https://demo.firebaseio.com/root/counters/blog/total.json");
    }

    #[test]
    fn test_rejects_invalid_url() {
        let result = HttpDocumentStore::new(&store_config("not a url"));
        assert!(matches!(result, Err(StoreError::Client(_))));
    }

    #[test]
    fn test_parse_body() {
        let path = StorePath::new("x");
        assert_eq!(parse_body(&path, "null"), None);
        assert_eq!(parse_body(&path, "  null\n"), None);
        assert_eq!(parse_body(&path, ""), None);
        assert_eq!(parse_body(&path, "{broken"), None);
        assert_eq!(parse_body(&path, "12"), Some(json!(12)));
        assert_eq!(parse_body(&path, "\"2026-10-19T00:00:00.000Z\""), Some(json!("2026-10-19T00:00:00.000Z")));
    }

    #[tokio::test]
    async fn test_unreachable_store_reads_absent() {
        // Nothing listens on port 9 of the loopback interface
        let mut config = store_config("http://127.0.0.1:9/");
        config.timeout_secs = 2;
        let store = HttpDocumentStore::new(&config).unwrap();
        let path = StorePath::new("counters/a/total");

        assert!(store.get(&path).await.is_none());
        assert!(store.put(&path, &json!(1)).await.is_err());
    }
}
