//! Error types for retention runs

use thiserror::Error;

/// Invalid policy parameters. Fatal for the whole run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid policy: {field} must be >= 0 (got {value})")]
    NegativeHorizon { field: &'static str, value: i64 },

    #[error("Invalid policy: {field} = {value} is too large")]
    HorizonTooLarge { field: &'static str, value: i64 },

    #[error("Invalid timezone '{timezone}': {message}")]
    InvalidTimezone { timezone: String, message: String },

    #[error("Retention horizon is outside the representable calendar range")]
    HorizonOutOfRange,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// A group's snapshot sequence cannot be evaluated. Only that group is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("No snapshots for group {group}")]
    Empty { group: String },

    #[error(
        "Snapshots for group {group} are not sorted: {snapshot_id} (position {index}) is older than its predecessor"
    )]
    Unsorted {
        group: String,
        index: usize,
        snapshot_id: String,
    },
}
