//! Temporary workspaces with a config file and a snapshot inventory

use super::cli::PurgeCommand;
use anyhow::Result;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Reference time used by every workflow
pub const NOW: &str = "2024-06-15T12:00:00Z";

/// Policy keeping 6 hours of everything, then 3 days of dailies
pub const SHORT_POLICY: &str = r#"
[policy]
hours = 6
days = 3
weeks = 0
months = 0
"#;

/// One inventory entry
pub fn snapshot(id: &str, volume: &str, start_time: &str) -> Value {
    json!({
        "snapshot_id": id,
        "volume_id": volume,
        "region": "us-east-1",
        "owner_id": "111111111111",
        "state": "completed",
        "start_time": start_time,
        "tags": {},
    })
}

/// Four snapshots of `volume` relative to [`NOW`]: one past the horizon, two
/// on the same day inside the daily tier and one in the keep-all window
pub fn daily_history(volume: &str) -> Vec<Value> {
    vec![
        snapshot(&format!("{volume}-old"), volume, "2024-06-03T00:00:00Z"),
        snapshot(&format!("{volume}-day"), volume, "2024-06-13T10:00:00Z"),
        snapshot(&format!("{volume}-dup"), volume, "2024-06-13T11:00:00Z"),
        snapshot(&format!("{volume}-new"), volume, "2024-06-15T10:00:00Z"),
    ]
}

/// Temporary directory holding `purge.toml` and `snapshots.json`
pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    /// Create a workspace with the given config and inventory
    pub fn new(config: &str, snapshots: Vec<Value>) -> Result<Self> {
        let env = Self {
            dir: tempfile::tempdir()?,
        };
        env.write_config(config)?;
        env.write_inventory(snapshots)?;
        Ok(env)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("purge.toml")
    }

    pub fn inventory_path(&self) -> PathBuf {
        self.path().join("snapshots.json")
    }

    pub fn write_config(&self, config: &str) -> Result<()> {
        std::fs::write(self.config_path(), config)?;
        Ok(())
    }

    pub fn write_inventory(&self, snapshots: Vec<Value>) -> Result<()> {
        let data = serde_json::to_vec_pretty(&json!({ "snapshots": snapshots }))?;
        std::fs::write(self.inventory_path(), data)?;
        Ok(())
    }

    /// Write an arbitrary file into the workspace
    pub fn write_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.path().join(name);
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Snapshot ids currently in the inventory, in file order
    pub fn inventory_ids(&self) -> Result<Vec<String>> {
        let content = std::fs::read_to_string(self.inventory_path())?;
        let value: Value = serde_json::from_str(&content)?;
        Ok(value["snapshots"]
            .as_array()
            .map(|snaps| {
                snaps
                    .iter()
                    .filter_map(|s| s["snapshot_id"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Command running in this workspace
    pub fn cmd(&self) -> PurgeCommand {
        PurgeCommand::new(self.path())
    }

    /// `snap-purge run --now NOW` plus extra arguments
    pub fn run(&self, extra: &[&str]) -> PurgeCommand {
        let mut cmd = self.cmd();
        cmd.args(&["run", "--now", NOW]).args(extra);
        cmd
    }
}
