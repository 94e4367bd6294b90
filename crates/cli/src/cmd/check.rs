//! Validate a configuration and show what a run would use

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use cli_lib::{logging, Config, RunPlan};
use owo_colors::OwoColorize;
use purge_core::PolicyConfig;
use std::path::Path;

fn hours(delta: TimeDelta) -> String {
    let h = delta.num_hours();
    format!("{}h ({}d {}h)", h, h / 24, h % 24)
}

pub fn run(config_path: &Path, now: Option<DateTime<Utc>>) -> Result<()> {
    // 1. Load and validate
    let config = Config::load(config_path)?;
    let _guard = logging::init(&config.logging.level, config.log_directory().as_deref())?;
    let plan = RunPlan::from_config(&config, None).context("Invalid configuration")?;
    let policy = PolicyConfig::new(&config.policy, now.unwrap_or_else(Utc::now), true)
        .context("Invalid retention policy")?;

    // 2. Display derived thresholds
    println!("{}", "Configuration OK".green().bold());
    println!("{}: {}\n", "Location".dimmed(), config_path.display().dimmed());

    println!("{}", "[policy]".yellow());
    println!(
        "  hours = {}, days = {}, weeks = {}, months = {}",
        policy.hours(),
        policy.days(),
        policy.weeks(),
        policy.months()
    );
    println!("  timezone = {}", policy.timezone());
    println!("  now = {}", policy.now().to_rfc3339());
    println!("  hourly window: {}", hours(policy.hourly_window()));
    println!("  weekly tier start: {}", hours(policy.weekly_tier_start()));
    println!("  monthly tier start: {}", hours(policy.monthly_tier_start()));
    println!("  retention horizon: {}", policy.retention_horizon().to_rfc3339());

    // 3. Display what would be evaluated
    println!("\n{}", "[selection]".yellow());
    println!("  regions: {}", plan.regions.join(", "));
    for selector in &plan.groups {
        println!("  group: {}", selector.group_id());
    }
    println!("  inventory: {}", config.inventory_path().display());

    Ok(())
}
