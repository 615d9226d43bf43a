//! Store addressing and error definitions.

use std::fmt;

use thiserror::Error;

/// Slash-delimited address of a single JSON value in the document store.
///
/// Paths are stored without the `.json` suffix the HTTP protocol expects;
/// the HTTP backend appends it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorePath(String);

impl StorePath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors that can occur while writing to the document store.
///
/// Reads never produce errors; an unreadable value is treated as absent.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request could not be delivered or its response not received.
    #[error("store request for '{path}' failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The store did not answer in time.
    #[error("store request for '{path}' timed out after {secs} seconds")]
    Timeout { path: String, secs: u64 },

    /// Every conditional write attempt lost against a concurrent writer.
    #[error("gave up updating '{path}' after {attempts} conflicting writes")]
    Contention { path: String, attempts: u32 },

    /// The HTTP client could not be constructed.
    #[error("failed to build store client: {0}")]
    Client(String),

    /// The store refused service altogether.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
