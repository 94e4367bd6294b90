//! Snapshot source seam

use async_trait::async_trait;
use purge_core::Snapshot;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Which snapshots form one group within a region
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupSelector {
    /// Snapshots of one volume
    Volume(String),
    /// Every snapshot of the account, across volumes
    AllVolumes,
    /// Snapshots carrying all of these tags
    Tags(BTreeMap<String, String>),
}

impl GroupSelector {
    /// Stable, human-readable identifier of the group
    pub fn group_id(&self) -> String {
        match self {
            GroupSelector::Volume(id) => id.clone(),
            GroupSelector::AllVolumes => crate::config::ALL_VOLUMES.to_string(),
            GroupSelector::Tags(tags) => tags
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Failure to list snapshots for a group
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read snapshot inventory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed snapshot inventory {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Snapshot source unavailable: {0}")]
    Unavailable(String),
}

/// Lists completed snapshots for a group
///
/// Implementations return only completed snapshots, restricted to
/// `account` when it is given, sorted ascending by start time.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn snapshots(
        &self,
        region: &str,
        account: Option<&str>,
        selector: &GroupSelector,
    ) -> Result<Vec<Snapshot>, SourceError>;
}
