//! Counter subsystem.
//!
//! # Data Flow
//! ```text
//! get:  CounterKey → service.rs → store reads (total, unique, updated_at)
//!                             → format.rs → CounterSnapshot
//!
//! hit:  CounterKey + IP + day → unique marker (insert_if_absent, optional)
//!                             → increment total / unique
//!                             → put updated_at
//!                             → get
//! ```
//!
//! # Design Decisions
//! - No in-process state; every call round-trips to the store
//! - Without unique mode every hit also increments `unique`

pub mod format;
pub mod service;
pub mod types;

pub use format::format_count;
pub use service::CounterService;
pub use types::{CounterField, CounterKey, CounterSnapshot, DEFAULT_KEY};
