//! End-to-end tests: client → counter service → mock document store.

use chrono::Utc;
use futures_util::future::join_all;
use serde_json::{json, Value};

use hit_counter::config::AdapterKind;

mod common;

use common::{client, counter_config, start_counter, MockStore};

async fn setup() -> (MockStore, common::RunningCounter) {
    let mock = MockStore::default();
    let url = mock.start().await;
    let counter = start_counter(counter_config(&url)).await;
    (mock, counter)
}

async fn fetch(url: String, ip: &str) -> Value {
    let res = client().get(url).header("x-real-ip", ip).send().await.unwrap();
    assert_eq!(res.status(), 200);
    res.json().await.unwrap()
}

#[tokio::test]
async fn test_get_unknown_key_is_zero() {
    let (_mock, counter) = setup().await;

    let body = fetch(format!("{}/api/get?key=fresh", counter.base_url), "10.0.0.1").await;
    assert_eq!(
        body,
        json!({
            "key": "fresh",
            "total": 0,
            "unique": 0,
            "total_formatted": "0",
            "unique_formatted": "0",
            "updated_at": null,
        })
    );
    counter.shutdown.trigger();
}

#[tokio::test]
async fn test_hit_increments_and_persists() {
    let (mock, counter) = setup().await;

    let first = fetch(format!("{}/api/hit?key=blog", counter.base_url), "10.0.0.1").await;
    assert_eq!(first["total"], 1);
    assert_eq!(first["unique"], 1);
    assert!(first["updated_at"].is_string());

    let second = fetch(format!("{}/api/hit?key=blog", counter.base_url), "10.0.0.1").await;
    assert_eq!(second["total"], 2);
    assert_eq!(second["unique"], 2);

    let read = fetch(format!("{}/api/get?key=blog", counter.base_url), "10.0.0.2").await;
    assert_eq!(read["total"], 2);
    assert_eq!(mock.value("counters/blog/total"), Some(json!(2)));
    counter.shutdown.trigger();
}

#[tokio::test]
async fn test_unique_mode_counts_each_ip_once_per_day() {
    let (mock, counter) = setup().await;
    let url = format!("{}/api/hit?key=docs&unique=1", counter.base_url);

    fetch(url.clone(), "10.0.0.1").await;
    fetch(url.clone(), "10.0.0.1").await;
    let body = fetch(url, "10.0.0.2").await;

    assert_eq!(body["total"], 3);
    assert_eq!(body["unique"], 2);

    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
    assert_eq!(mock.value(&format!("unique/docs/{}/10.0.0.1", today)), Some(json!(true)));
    counter.shutdown.trigger();
}

#[tokio::test]
async fn test_missing_key_uses_default() {
    let (mock, counter) = setup().await;

    let body = fetch(format!("{}/api/hit", counter.base_url), "10.0.0.1").await;
    assert_eq!(body["key"], "default");
    assert_eq!(mock.value("counters/default/total"), Some(json!(1)));
    counter.shutdown.trigger();
}

#[tokio::test]
async fn test_formatted_counts() {
    let (mock, counter) = setup().await;
    mock.set("counters/big/total", json!(1_234_567));
    mock.set("counters/big/unique", json!(9_999));

    let body = fetch(format!("{}/api/get?key=big", counter.base_url), "10.0.0.1").await;
    assert_eq!(body["total_formatted"], "1.2m");
    assert_eq!(body["unique_formatted"], "10.0k");
    counter.shutdown.trigger();
}

#[tokio::test]
async fn test_preflight_and_cors() {
    let (_mock, counter) = setup().await;

    let res = client()
        .request(reqwest::Method::OPTIONS, format!("{}/api/hit", counter.base_url))
        .header("origin", "https://blog.example")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204);
    assert_eq!(res.headers()["access-control-allow-origin"], "https://blog.example");
    assert_eq!(res.headers()["access-control-allow-methods"], "GET,OPTIONS");
    assert_eq!(res.headers()["access-control-max-age"], "86400");

    let res = client()
        .get(format!("{}/api/get", counter.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    assert!(res.headers().contains_key("x-request-id"));
    counter.shutdown.trigger();
}

#[tokio::test]
async fn test_unmatched_path_returns_banner() {
    let (mock, counter) = setup().await;

    let res = client().get(format!("{}/", counter.base_url)).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "Hit Counter API (Firebase + Render) ✔");
    assert_eq!(mock.puts(), 0);
    counter.shutdown.trigger();
}

#[tokio::test]
async fn test_concurrent_hits_are_all_counted() {
    let (mock, counter) = setup().await;
    let url = format!("{}/api/hit?key=rush&unique=1", counter.base_url);

    let requests = (0..25).map(|i| fetch(url.clone(), if i % 5 == 0 { "10.0.0.1" } else { "10.0.0.2" }));
    join_all(requests).await;

    assert_eq!(mock.value("counters/rush/total"), Some(json!(25)));
    assert_eq!(mock.value("counters/rush/unique"), Some(json!(2)));
    counter.shutdown.trigger();
}

#[tokio::test]
async fn test_function_adapter_routes_and_headers() {
    let mock = MockStore::default();
    let url = mock.start().await;
    let mut config = counter_config(&url);
    config.adapter.kind = AdapterKind::Function;
    let counter = start_counter(config).await;

    let res = client()
        .get(format!("{}/api/hit?key=fn&unique=1", counter.base_url))
        .header("cf-connecting-ip", "1.1.1.1")
        .header("x-real-ip", "2.2.2.2")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let body = fetch(format!("{}/get?key=fn", counter.base_url), "3.3.3.3").await;
    assert_eq!(body["total"], 1);

    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
    assert_eq!(mock.value(&format!("unique/fn/{}/1.1.1.1", today)), Some(json!(true)));

    let res = client().get(format!("{}/status", counter.base_url)).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "Hit Counter API is running on Firebase Functions! ✔");
    counter.shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_store() {
    // Bind and drop to find a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut config = counter_config(&format!("http://{}/", addr));
    config.store.timeout_secs = 2;
    let counter = start_counter(config).await;

    let res = client()
        .get(format!("{}/api/get?key=blog", counter.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["total"], 0);

    let res = client()
        .get(format!("{}/api/hit?key=blog", counter.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 502);
    assert_eq!(res.text().await.unwrap(), "Counter store unavailable");
    counter.shutdown.trigger();
}
