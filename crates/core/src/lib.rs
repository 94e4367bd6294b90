//! Tiered snapshot retention for snapshot-purge runs
//!
//! This crate provides:
//! - Snapshot data structures
//! - Retention policy declaration and derived tier boundaries
//! - Tier classification with typed bucket keys
//! - The keep/delete walk over one group's snapshots
//! - Per-group keep/delete reporting
//!
//! Everything here is pure: no clock reads, no I/O. Callers inject "now"
//! through [`PolicyConfig`] and apply deletions themselves.

pub mod calendar;
pub mod engine;
pub mod error;
pub mod policy;
pub mod report;
pub mod snapshot;
pub mod tier;

// Re-exports
pub use engine::{Action, Decision, Reason, RetentionEngine, RetentionWalk};
pub use error::{ConfigError, InputError};
pub use policy::{PolicyConfig, PolicySpec};
pub use report::GroupReport;
pub use snapshot::Snapshot;
pub use tier::{classify, BucketKey, Tier};
