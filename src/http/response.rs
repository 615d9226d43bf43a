//! Response descriptors and their HTTP rendering.
//!
//! # Responsibilities
//! - Describe every answer the service can give, independent of axum
//! - Render CORS headers exactly as browsers expect them
//!
//! # Design Decisions
//! - Preflight answers are fixed; only the allowed origin varies
//! - Store failures become 502 with a plaintext body

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::counter::CounterSnapshot;

pub const ALLOW_METHODS: &str = "GET,OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";
pub const MAX_AGE_SECS: &str = "86400";
pub const STORE_UNAVAILABLE_BODY: &str = "Counter store unavailable";

/// Outcome of dispatching one request.
#[derive(Debug, Clone, PartialEq)]
pub enum CounterResponse {
    /// 204 answer to an `OPTIONS` request.
    Preflight { origin: HeaderValue },
    /// 200 JSON counts.
    Counts {
        origin: HeaderValue,
        snapshot: CounterSnapshot,
    },
    /// 200 plaintext for unknown paths.
    Banner(String),
    /// 502 when the store refused a write.
    StoreUnavailable { origin: HeaderValue },
}

impl CounterResponse {
    pub fn status(&self) -> StatusCode {
        match self {
            CounterResponse::Preflight { .. } => StatusCode::NO_CONTENT,
            CounterResponse::Counts { .. } | CounterResponse::Banner(_) => StatusCode::OK,
            CounterResponse::StoreUnavailable { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for CounterResponse {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            CounterResponse::Preflight { origin } => (
                status,
                [
                    (header::ACCESS_CONTROL_ALLOW_ORIGIN, origin),
                    (header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS)),
                    (header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS)),
                    (header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE_SECS)),
                ],
            )
                .into_response(),
            CounterResponse::Counts { origin, snapshot } => (
                status,
                [
                    (header::ACCESS_CONTROL_ALLOW_ORIGIN, origin),
                    (header::VARY, HeaderValue::from_static("Origin")),
                ],
                Json(snapshot),
            )
                .into_response(),
            CounterResponse::Banner(banner) => (status, banner).into_response(),
            CounterResponse::StoreUnavailable { origin } => (
                status,
                [(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin)],
                STORE_UNAVAILABLE_BODY,
            )
                .into_response(),
        }
    }
}
