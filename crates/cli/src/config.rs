//! Configuration file (`purge.toml`)

use crate::source::GroupSelector;
use anyhow::{Context, Result};
use purge_core::{ConfigError, PolicySpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Volume id that selects every snapshot of the account as one group
pub const ALL_VOLUMES: &str = "all";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub policy: PolicySpec,

    #[serde(default)]
    pub selection: SelectionConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub run: RunConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Directory of the loaded file, for resolving relative paths
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

/// Which snapshots to evaluate. Exactly one of the two must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Volume ids, or `["all"]`
    #[serde(default)]
    pub volumes: Vec<String>,

    /// Tag filter; all pairs must match
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// JSON snapshot inventory
    #[serde(default = "default_inventory")]
    pub inventory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Regions evaluated independently, in order
    #[serde(default = "default_regions")]
    pub regions: Vec<String>,

    /// Groups evaluated at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Also write a daily rolling log file here
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            inventory: default_inventory(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            regions: default_regions(),
            concurrency: default_concurrency(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

fn default_inventory() -> PathBuf {
    PathBuf::from("snapshots.json")
}

fn default_regions() -> Vec<String> {
    vec!["us-east-1".to_string()]
}

fn default_concurrency() -> usize {
    4
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Parse config text without touching the filesystem
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Check cross-field constraints
    ///
    /// Policy horizons are validated separately when the run's
    /// [`purge_core::PolicyConfig`] is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.selection.groups()?;

        if self.run.regions.is_empty() {
            return Err(ConfigError::Invalid(
                "run.regions must list at least one region".to_string(),
            ));
        }
        if self.run.regions.iter().any(|r| r.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "run.regions must not contain empty names".to_string(),
            ));
        }
        if self.run.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "run.concurrency must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Inventory path, relative paths resolved against the config file
    pub fn inventory_path(&self) -> PathBuf {
        match &self.base_dir {
            Some(dir) if self.source.inventory.is_relative() => dir.join(&self.source.inventory),
            _ => self.source.inventory.clone(),
        }
    }

    /// Log directory, relative paths resolved against the config file
    pub fn log_directory(&self) -> Option<PathBuf> {
        let dir = self.logging.directory.as_ref()?;
        match &self.base_dir {
            Some(base) if dir.is_relative() => Some(base.join(dir)),
            _ => Some(dir.clone()),
        }
    }
}

impl SelectionConfig {
    /// Expand the selection into per-region group selectors
    ///
    /// Volume ids each form one group; `"all"` forms a single group over
    /// every volume and cannot be combined with explicit ids; a tag filter
    /// forms a single group.
    pub fn groups(&self) -> Result<Vec<GroupSelector>, ConfigError> {
        match (self.volumes.is_empty(), self.tags.is_empty()) {
            (false, true) => self.volume_groups(),
            (true, false) => Ok(vec![GroupSelector::Tags(self.tags.clone())]),
            _ => Err(ConfigError::Invalid(
                "populate either selection.volumes or selection.tags, but not both".to_string(),
            )),
        }
    }

    fn volume_groups(&self) -> Result<Vec<GroupSelector>, ConfigError> {
        let all_count = self.volumes.iter().filter(|v| *v == ALL_VOLUMES).count();
        if all_count == self.volumes.len() {
            return Ok(vec![GroupSelector::AllVolumes]);
        }
        // Groups must not overlap: "all" would purge the listed volumes too
        if all_count > 0 {
            return Err(ConfigError::Invalid(format!(
                "selection.volumes cannot mix \"{ALL_VOLUMES}\" with explicit volume ids"
            )));
        }

        let mut groups: Vec<GroupSelector> = Vec::new();
        for volume in &self.volumes {
            let selector = GroupSelector::Volume(volume.clone());
            // A volume listed twice would be purged twice
            if !groups.contains(&selector) {
                groups.push(selector);
            }
        }
        Ok(groups)
    }
}

/// Annotated example configuration
pub fn example_config() -> &'static str {
    r#"# snap-purge configuration

[policy]
# Keep ALL snapshots younger than this many hours
hours = 24
# Then keep ONE snapshot per day for this many days
days = 7
# Then keep ONE snapshot per week for this many weeks
weeks = 4
# Then keep ONE snapshot per month for this many months
months = 12
# Day/week/month boundaries are computed in this timezone
timezone = "UTC"
# Truncate "now" to the hour so repeated runs within an hour agree
floor_now_to_hour = true

[selection]
# Either list volume ids (or ["all"]) ...
volumes = ["vol-0123456789abcdef0"]
# ... or select snapshots by tag, but not both
# tags = { backup = "nightly", env = "prod" }

[source]
# JSON snapshot inventory, relative to this file
inventory = "snapshots.json"

[run]
regions = ["us-east-1"]
concurrency = 4

[logging]
# Used when RUST_LOG is not set
level = "warn"
# directory = "logs"
"#
}
