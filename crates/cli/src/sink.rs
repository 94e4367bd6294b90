//! Deletion sink seam

use async_trait::async_trait;
use thiserror::Error;

/// Failure to delete one snapshot
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Snapshot {snapshot_id} not found in {region}")]
    NotFound { region: String, snapshot_id: String },

    #[error("Failed to persist deletion: {0}")]
    Io(#[from] std::io::Error),

    #[error("Deletion rejected: {0}")]
    Rejected(String),
}

/// Irreversibly deletes snapshots
///
/// Each call is independent; a failure says nothing about other snapshots.
#[async_trait]
pub trait DeletionSink: Send + Sync {
    async fn delete(&self, region: &str, snapshot_id: &str) -> Result<(), SinkError>;
}

/// Sink used for dry runs: deletes nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunSink;

#[async_trait]
impl DeletionSink for DryRunSink {
    async fn delete(&self, region: &str, snapshot_id: &str) -> Result<(), SinkError> {
        tracing::debug!(region, snapshot_id, "Dry run: skipping delete");
        Ok(())
    }
}
