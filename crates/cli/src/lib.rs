//! Orchestration around the retention core
//!
//! This crate provides:
//! - Configuration file loading and validation
//! - Trigger payload parsing ("now", dry-run, owner account)
//! - Snapshot source and deletion sink seams, with a JSON inventory backend
//! - The per-region, per-group runner
//! - Console and JSON presentation of a run

pub mod config;
pub mod event;
pub mod inventory;
pub mod logging;
pub mod present;
pub mod runner;
pub mod sink;
pub mod source;

// Re-exports
pub use config::Config;
pub use event::{Trigger, TriggerEvent};
pub use inventory::Inventory;
pub use runner::{GroupOutcome, GroupStatus, RunPlan, RunSummary, Runner};
pub use sink::{DeletionSink, DryRunSink, SinkError};
pub use source::{GroupSelector, SnapshotSource, SourceError};
