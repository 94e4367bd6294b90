//! Full retention run

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use cli_lib::present::{self, Presenter};
use cli_lib::{logging, Config, Inventory, RunPlan, Runner, Trigger, TriggerEvent};
use purge_core::PolicyConfig;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Command-line overrides for a run
pub struct RunOptions {
    pub event: Option<PathBuf>,
    pub now: Option<DateTime<Utc>>,
    pub dry_run: bool,
    pub json: bool,
    pub inventory: Option<PathBuf>,
}

pub async fn run(config_path: &Path, options: RunOptions) -> Result<()> {
    // 1. Load configuration and start logging
    let config = Config::load(config_path)?;
    let _guard = logging::init(&config.logging.level, config.log_directory().as_deref())?;
    config.validate().context("Invalid configuration")?;

    // 2. Resolve the trigger
    let event = options
        .event
        .as_deref()
        .map(TriggerEvent::load)
        .transpose()?;
    let trigger = Trigger::resolve(event, options.now, options.dry_run);

    // 3. Derive the policy for this run
    let policy = PolicyConfig::new(&config.policy, trigger.now, trigger.dry_run)
        .context("Invalid retention policy")?;
    let policy = Arc::new(policy);

    // 4. Open the snapshot inventory
    let inventory_path = options
        .inventory
        .unwrap_or_else(|| config.inventory_path());
    let inventory = Inventory::open(&inventory_path).context("Failed to open snapshot inventory")?;
    let inventory = Arc::new(inventory);

    // 5. Evaluate every group
    let plan = RunPlan::from_config(&config, trigger.account)?;
    let runner = Runner::new(policy.clone(), inventory.clone(), inventory, plan);
    let summary = runner.run().await;

    // 6. Report
    let mut out = std::io::stdout().lock();
    if options.json {
        present::render_json(&mut out, &summary).context("Failed to write run summary")?;
    } else {
        Presenter::new(&policy, super::use_color()).render(&mut out, &summary)?;
    }
    out.flush()?;

    if summary.has_failures() {
        bail!(
            "{} of {} groups did not complete cleanly",
            summary.failed_groups(),
            summary.groups.len()
        );
    }
    Ok(())
}
