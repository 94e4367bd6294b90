//! JSON snapshot inventory
//!
//! A catalog file standing in for the cloud provider's snapshot listing:
//!
//! ```json
//! { "snapshots": [
//!     { "snapshot_id": "snap-1", "volume_id": "vol-1", "region": "us-east-1",
//!       "owner_id": "123456789012", "state": "completed",
//!       "start_time": "2024-06-01T03:00:00Z", "tags": { "env": "prod" } }
//! ] }
//! ```
//!
//! The same inventory serves as snapshot source and deletion sink. Each
//! deletion rewrites the file atomically.

use crate::sink::{DeletionSink, SinkError};
use crate::source::{GroupSelector, SnapshotSource, SourceError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use purge_core::snapshot::sort_chronologically;
use purge_core::Snapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Lifecycle state of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotState {
    Pending,
    Completed,
    Error,
}

fn default_state() -> SnapshotState {
    SnapshotState::Completed
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub snapshot_id: String,
    #[serde(default)]
    pub volume_id: Option<String>,
    pub region: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default = "default_state")]
    pub state: SnapshotState,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl SnapshotRecord {
    fn matches(&self, region: &str, account: Option<&str>, selector: &GroupSelector) -> bool {
        if self.region != region || self.state != SnapshotState::Completed {
            return false;
        }
        if let Some(account) = account {
            if self.owner_id.as_deref() != Some(account) {
                return false;
            }
        }
        match selector {
            GroupSelector::Volume(volume) => self.volume_id.as_deref() == Some(volume.as_str()),
            GroupSelector::AllVolumes => true,
            GroupSelector::Tags(tags) => tags.iter().all(|(k, v)| self.tags.get(k) == Some(v)),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct InventoryFile {
    #[serde(default)]
    snapshots: Vec<SnapshotRecord>,
}

#[derive(Serialize)]
struct InventoryFileRef<'a> {
    snapshots: &'a [SnapshotRecord],
}

/// Snapshot catalog shared by source and sink
pub struct Inventory {
    /// Backing file; `None` keeps everything in memory
    path: Option<PathBuf>,
    records: Mutex<Vec<SnapshotRecord>>,
    /// One catalog rewrite at a time, so the file always ends on the latest state
    write_lock: tokio::sync::Mutex<()>,
}

impl Inventory {
    /// Load an inventory file
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: InventoryFile =
            serde_json::from_str(&content).map_err(|source| SourceError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!(
            path = %path.display(),
            snapshots = file.snapshots.len(),
            "Loaded snapshot inventory"
        );

        Ok(Self {
            path: Some(path.to_path_buf()),
            records: Mutex::new(file.snapshots),
            write_lock: tokio::sync::Mutex::new(()),
        })
    }

    /// Inventory that is never written to disk
    pub fn in_memory(records: Vec<SnapshotRecord>) -> Self {
        Self {
            path: None,
            records: Mutex::new(records),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Copy of the current records
    pub fn records(&self) -> Vec<SnapshotRecord> {
        self.records.lock().clone()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether the inventory has no records
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Write an encoded catalog off the async runtime
    async fn persist(&self, encoded: Option<io::Result<Vec<u8>>>) -> io::Result<()> {
        let (Some(path), Some(encoded)) = (self.path.clone(), encoded) else {
            return Ok(());
        };
        let data = encoded?;
        tokio::task::spawn_blocking(move || atomic_write(&path, &data))
            .await
            .map_err(io::Error::other)?
    }
}

#[async_trait]
impl SnapshotSource for Inventory {
    async fn snapshots(
        &self,
        region: &str,
        account: Option<&str>,
        selector: &GroupSelector,
    ) -> Result<Vec<Snapshot>, SourceError> {
        let mut snapshots: Vec<Snapshot> = self
            .records
            .lock()
            .iter()
            .filter(|r| r.matches(region, account, selector))
            .map(|r| Snapshot::new(r.snapshot_id.clone(), r.start_time))
            .collect();
        sort_chronologically(&mut snapshots);
        Ok(snapshots)
    }
}

#[async_trait]
impl DeletionSink for Inventory {
    async fn delete(&self, region: &str, snapshot_id: &str) -> Result<(), SinkError> {
        let _write = self.write_lock.lock().await;

        let (index, removed, encoded) = {
            let mut records = self.records.lock();
            let index = records
                .iter()
                .position(|r| r.region == region && r.snapshot_id == snapshot_id)
                .ok_or_else(|| SinkError::NotFound {
                    region: region.to_string(),
                    snapshot_id: snapshot_id.to_string(),
                })?;
            let removed = records.remove(index);
            let encoded = self.path.as_ref().map(|_| {
                serde_json::to_vec_pretty(&InventoryFileRef { snapshots: &records })
                    .map_err(io::Error::from)
            });
            (index, removed, encoded)
        };

        if let Err(e) = self.persist(encoded).await {
            // Memory must keep matching the file
            self.records.lock().insert(index, removed);
            return Err(SinkError::Io(e));
        }
        Ok(())
    }
}

/// Atomic write helper
///
/// Writes data to a temporary sibling file, fsyncs it, renames it over the
/// target, then fsyncs the directory so readers never see a partial
/// inventory. The temporary file is removed if any step before the rename
/// completes fails.
fn atomic_write(target: &Path, data: &[u8]) -> io::Result<()> {
    let mut tmp_name = target.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = target.with_file_name(tmp_name);

    let written = write_synced(&tmp_path, data).and_then(|()| std::fs::rename(&tmp_path, target));
    if let Err(e) = written {
        // Best effort; the original error is what matters
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }
    sync_parent(target)
}

fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

#[cfg(unix)]
fn sync_parent(target: &Path) -> io::Result<()> {
    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::File::open(parent)?.sync_all()
}

#[cfg(not(unix))]
fn sync_parent(_target: &Path) -> io::Result<()> {
    Ok(())
}
