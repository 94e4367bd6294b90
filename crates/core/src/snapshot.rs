//! Snapshot data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point-in-time copy of a storage volume
///
/// Read-only input to the retention walk. Identifiers are opaque and only
/// need to be unique within a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Provider-assigned identifier (e.g. `snap-0123abcd`)
    pub id: String,
    /// Instant the snapshot was started
    pub started_at: DateTime<Utc>,
}

impl Snapshot {
    /// Create a new snapshot record
    pub fn new(id: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            started_at,
        }
    }
}

/// Sort snapshots ascending by start time, the order the engine requires
///
/// Ties keep their relative order.
pub fn sort_chronologically(snapshots: &mut [Snapshot]) {
    snapshots.sort_by_key(|s| s.started_at);
}
