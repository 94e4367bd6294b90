//! Trigger payload
//!
//! A scheduled run is started with a small JSON event:
//! `{ "time": "2024-06-15T12:00:00Z", "account": "123456789012", "noop": true }`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// Raw trigger event; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerEvent {
    /// Reference "now" of the run
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,

    /// Only snapshots owned by this account are considered
    #[serde(default)]
    pub account: Option<String>,

    /// Dry run; absent means a destructive run
    #[serde(default)]
    pub noop: bool,
}

impl TriggerEvent {
    /// Parse an event from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Malformed trigger event")
    }

    /// Read an event from a file, or from stdin when `path` is `-`
    pub fn load(path: &Path) -> Result<Self> {
        let text = if path == Path::new("-") {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read trigger event from stdin")?;
            buf
        } else {
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read trigger event {}", path.display()))?
        };
        Self::from_json(&text)
    }
}

/// Resolved run parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub now: DateTime<Utc>,
    pub account: Option<String>,
    pub dry_run: bool,
}

impl Trigger {
    /// Combine the event with command-line overrides
    ///
    /// "now" comes from `now_override`, then the event, then the system
    /// clock. Dry run is on if either the event or the flag asks for it.
    pub fn resolve(
        event: Option<TriggerEvent>,
        now_override: Option<DateTime<Utc>>,
        force_dry_run: bool,
    ) -> Self {
        let event = event.unwrap_or_default();
        Self {
            now: now_override.or(event.time).unwrap_or_else(Utc::now),
            account: event.account,
            dry_run: force_dry_run || event.noop,
        }
    }
}
