//! Request parsing and request IDs.
//!
//! # Responsibilities
//! - Turn method, URI and headers into a transport-neutral `CounterRequest`
//! - Generate a UUID v4 request ID for every inbound request
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Query parsing follows form-urlencoding; the first occurrence of a parameter wins

use axum::http::{header, HeaderMap, HeaderValue, Method, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::counter::CounterKey;
use crate::http::adapter::{AdapterProfile, Operation};

pub const X_REQUEST_ID: &str = "x-request-id";

/// A parsed inbound request, independent of the hosting environment.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterRequest {
    pub method: Method,
    pub operation: Operation,
    pub key: CounterKey,
    /// `unique=1` was present.
    pub unique_mode: bool,
    pub client_ip: String,
    /// Value echoed in `Access-Control-Allow-Origin`.
    pub origin: HeaderValue,
}

impl CounterRequest {
    pub fn parse(profile: &AdapterProfile, method: &Method, uri: &Uri, headers: &HeaderMap) -> Self {
        let mut key = None;
        let mut unique = None;
        if let Some(query) = uri.query() {
            for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
                match &*name {
                    "key" if key.is_none() => key = Some(value.into_owned()),
                    "unique" if unique.is_none() => unique = Some(value.into_owned()),
                    _ => {}
                }
            }
        }

        let origin = headers
            .get(header::ORIGIN)
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("*"));

        Self {
            method: method.clone(),
            operation: profile.route(uri.path()),
            key: CounterKey::from_query(key.as_deref()),
            unique_mode: unique.as_deref() == Some("1"),
            client_ip: profile.client_ip(headers),
            origin,
        }
    }

    pub fn is_preflight(&self) -> bool {
        self.method == Method::OPTIONS
    }

    /// Metric label for this request.
    pub fn label(&self) -> &'static str {
        if self.is_preflight() {
            "preflight"
        } else {
            self.operation.as_str()
        }
    }
}

/// Request ID generator producing UUID v4 strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}
