//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, request ID)
//!     → request.rs (method, path, query, client IP, origin → CounterRequest)
//!         using adapter.rs (standalone or function profile)
//!     → dispatch.rs (preflight / get / hit / banner → CounterResponse)
//!     → response.rs (status, CORS headers, body)
//!     → Send to client
//! ```

pub mod adapter;
pub mod dispatch;
pub mod request;
pub mod response;
pub mod server;

pub use adapter::{AdapterProfile, Operation};
pub use request::{CounterRequest, MakeRequestUuidV4, X_REQUEST_ID};
pub use response::CounterResponse;
pub use server::{AppState, HttpServer, ServiceState};
