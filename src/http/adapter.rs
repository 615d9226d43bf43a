//! Transport adapter profiles.
//!
//! Both hosting environments share the dispatch logic and differ only in how
//! a path maps to an operation, which headers carry the client IP, and the
//! banner served on unknown paths.

use axum::http::{HeaderMap, HeaderName};

use crate::config::{AdapterConfig, AdapterKind};

/// IP used when no forwarding header is present.
pub const FALLBACK_CLIENT_IP: &str = "0.0.0.0";

pub const STANDALONE_BANNER: &str = "Hit Counter API (Firebase + Render) ✔";
pub const FUNCTION_BANNER: &str = "Hit Counter API is running on Firebase Functions! ✔";

/// What a request asks for, decided from its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    Hit,
    Banner,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Get => "get",
            Operation::Hit => "hit",
            Operation::Banner => "banner",
        }
    }
}

/// Path matching, IP resolution and banner of one hosting environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterProfile {
    kind: AdapterKind,
    client_ip_headers: Vec<HeaderName>,
    banner: String,
}

impl AdapterProfile {
    /// Generic HTTP handler: `/api/get`, `/api/hit`.
    pub fn standalone() -> Self {
        Self {
            kind: AdapterKind::Standalone,
            client_ip_headers: vec![
                HeaderName::from_static("x-real-ip"),
                HeaderName::from_static("x-forwarded-for"),
            ],
            banner: STANDALONE_BANNER.to_string(),
        }
    }

    /// Cloud-function handler: `/get`, `/hit`, optionally under `/api`.
    pub fn function() -> Self {
        Self {
            kind: AdapterKind::Function,
            client_ip_headers: vec![
                HeaderName::from_static("cf-connecting-ip"),
                HeaderName::from_static("x-real-ip"),
                HeaderName::from_static("x-forwarded-for"),
            ],
            banner: FUNCTION_BANNER.to_string(),
        }
    }

    pub fn from_config(config: &AdapterConfig) -> Self {
        let mut profile = match config.kind {
            AdapterKind::Standalone => Self::standalone(),
            AdapterKind::Function => Self::function(),
        };

        if let Some(names) = &config.client_ip_headers {
            profile.client_ip_headers = names
                .iter()
                .filter_map(|name| match HeaderName::from_bytes(name.as_bytes()) {
                    Ok(header) => Some(header),
                    Err(_) => {
                        tracing::warn!(header = %name, "Skipping invalid client IP header name");
                        None
                    }
                })
                .collect();
        }
        if let Some(banner) = &config.banner {
            profile.banner = banner.clone();
        }

        profile
    }

    pub fn kind(&self) -> AdapterKind {
        self.kind
    }

    pub fn banner(&self) -> &str {
        &self.banner
    }

    pub fn client_ip_headers(&self) -> &[HeaderName] {
        &self.client_ip_headers
    }

    /// Decide the operation from the request path.
    pub fn route(&self, path: &str) -> Operation {
        match self.kind {
            AdapterKind::Standalone => {
                if path.starts_with("/api/get") {
                    Operation::Get
                } else if path.starts_with("/api/hit") {
                    Operation::Hit
                } else {
                    Operation::Banner
                }
            }
            AdapterKind::Function => {
                // Only the first "/api" is dropped, wherever it occurs
                let path = path.replacen("/api", "", 1);
                if path.starts_with("/hit") {
                    Operation::Hit
                } else if path.starts_with("/get") {
                    Operation::Get
                } else {
                    Operation::Banner
                }
            }
        }
    }

    /// First non-empty forwarding header, in profile order.
    pub fn client_ip(&self, headers: &HeaderMap) -> String {
        self.client_ip_headers
            .iter()
            .filter_map(|name| headers.get(name))
            .filter_map(|value| value.to_str().ok())
            .map(str::trim)
            .find(|value| !value.is_empty())
            .unwrap_or(FALLBACK_CLIENT_IP)
            .to_string()
    }
}

impl Default for AdapterProfile {
    fn default() -> Self {
        Self::standalone()
    }
}
