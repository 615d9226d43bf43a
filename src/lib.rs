//! Hit counter service library.
//!
//! Counts total and unique visits per key in a remote JSON document store
//! and serves them over HTTP.

pub mod config;
pub mod counter;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod store;

pub use config::schema::CounterConfig;
pub use counter::{CounterKey, CounterService, CounterSnapshot};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use store::{DocumentStore, HttpDocumentStore, MemoryStore};
