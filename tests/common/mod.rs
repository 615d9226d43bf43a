//! Shared utilities for integration testing.
//!
//! `MockStore` speaks the subset of the Firebase REST protocol the counter
//! uses: `GET`/`PUT` on `<path>.json`, ETags on request, `if-match` guarded
//! writes answered with 412 on mismatch.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use hit_counter::config::{CounterConfig, StoreBackend};
use hit_counter::{HttpServer, Shutdown};

const NULL_ETAG: &str = "null_etag";

#[derive(Default)]
struct MockInner {
    docs: Mutex<HashMap<String, (Value, u64)>>,
    version: AtomicU64,
    etags_disabled: AtomicBool,
    failing: AtomicBool,
    forced_conflicts: AtomicU32,
    conflicts_served: AtomicU32,
    puts: AtomicU32,
}

/// In-process document store reachable over HTTP.
#[derive(Clone, Default)]
pub struct MockStore {
    inner: Arc<MockInner>,
}

impl MockStore {
    /// Start serving on an ephemeral port and return the base URL.
    pub async fn start(&self) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new()
            .route("/{*path}", get(read_doc).put(write_doc))
            .with_state(self.clone());

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{}/", addr)
    }

    pub fn value(&self, path: &str) -> Option<Value> {
        self.inner.docs.lock().unwrap().get(path).map(|(v, _)| v.clone())
    }

    pub fn set(&self, path: &str, value: Value) {
        let version = self.inner.version.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.docs.lock().unwrap().insert(path.to_string(), (value, version));
    }

    /// Stop handing out ETags, like a store without conditional requests.
    pub fn disable_etags(&self) {
        self.inner.etags_disabled.store(true, Ordering::SeqCst);
    }

    /// Answer every request with 500.
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    /// Reject the next `n` conditional writes with 412.
    pub fn force_conflicts(&self, n: u32) {
        self.inner.forced_conflicts.store(n, Ordering::SeqCst);
    }

    pub fn conflicts_served(&self) -> u32 {
        self.inner.conflicts_served.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> u32 {
        self.inner.puts.load(Ordering::SeqCst)
    }

    fn etag_of(&self, path: &str) -> String {
        match self.inner.docs.lock().unwrap().get(path) {
            Some((_, version)) => format!("v{}", version),
            None => NULL_ETAG.to_string(),
        }
    }
}

fn doc_path(raw: &str) -> String {
    raw.trim_start_matches('/').trim_end_matches(".json").to_string()
}

async fn read_doc(
    State(store): State<MockStore>,
    Path(raw): Path<String>,
    headers: HeaderMap,
) -> Response {
    if store.inner.failing.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let path = doc_path(&raw);
    let body = store.value(&path).unwrap_or(Value::Null).to_string();

    let wants_etag = headers
        .get("x-firebase-etag")
        .map(|v| v == "true")
        .unwrap_or(false);
    let mut response = (
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        body,
    )
        .into_response();
    if wants_etag && !store.inner.etags_disabled.load(Ordering::SeqCst) {
        let etag = HeaderValue::from_str(&store.etag_of(&path)).unwrap();
        response.headers_mut().insert(header::ETAG, etag);
    }
    response
}

async fn write_doc(
    State(store): State<MockStore>,
    Path(raw): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if store.inner.failing.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let path = doc_path(&raw);
    let value: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };

    let mut docs = store.inner.docs.lock().unwrap();
    if let Some(expected) = headers.get(header::IF_MATCH).and_then(|v| v.to_str().ok()) {
        let forced = store
            .inner
            .forced_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        let current = match docs.get(&path) {
            Some((_, version)) => format!("v{}", version),
            None => NULL_ETAG.to_string(),
        };
        if forced || current != expected {
            store.inner.conflicts_served.fetch_add(1, Ordering::SeqCst);
            return StatusCode::PRECONDITION_FAILED.into_response();
        }
    }

    store.inner.puts.fetch_add(1, Ordering::SeqCst);
    if value.is_null() {
        docs.remove(&path);
    } else {
        let version = store.inner.version.fetch_add(1, Ordering::SeqCst) + 1;
        docs.insert(path, (value.clone(), version));
    }
    (StatusCode::OK, value.to_string()).into_response()
}

/// Counter configuration pointing at `store_url`.
pub fn counter_config(store_url: &str) -> CounterConfig {
    let mut config = CounterConfig::default();
    config.store.backend = StoreBackend::Http;
    config.store.base_url = store_url.to_string();
    config.store.base_delay_ms = 1;
    config.store.max_delay_ms = 20;
    config.store.max_update_attempts = 100;
    config
}

/// A running counter service.
pub struct RunningCounter {
    pub base_url: String,
    pub shutdown: Shutdown,
}

/// Start the counter service on an ephemeral port.
pub async fn start_counter(mut config: CounterConfig) -> RunningCounter {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let server = HttpServer::new(config).unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let (_, config_updates) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    RunningCounter {
        base_url: format!("http://{}", addr),
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
