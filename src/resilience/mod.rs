//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Conditional write to the store:
//!     → 412 Precondition Failed (another writer won)
//!     → backoff.rs (jittered exponential delay)
//!     → re-read and retry, bounded by store.max_update_attempts
//! ```
//!
//! # Design Decisions
//! - Every store call has a deadline (reqwest client timeout)
//! - Only conflicting conditional writes are retried; plain writes never are
//! - Jittered backoff keeps colliding writers apart

pub mod backoff;

pub use backoff::BackoffPolicy;
