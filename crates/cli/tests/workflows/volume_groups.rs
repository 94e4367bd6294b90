//! Per-volume groups: live deletion, persistence and JSON output

use crate::common::{daily_history, snapshot, TestEnv, SHORT_POLICY};
use anyhow::Result;
use std::time::Duration;

/// Upper bound for a run over a handful of snapshots
const SMALL_RUN_BUDGET: Duration = Duration::from_secs(30);

fn volumes_config(volumes: &str) -> String {
    format!("{SHORT_POLICY}\n[selection]\nvolumes = {volumes}\n")
}

#[test]
fn test_live_run_deletes_superseded_snapshots() -> Result<()> {
    let env = TestEnv::new(&volumes_config(r#"["vol-a"]"#), daily_history("vol-a"))?;

    let result = env.run(&[]).assert_success()?;

    assert!(result.contains_stdout("---- RESULTS FOR vol-a (4 snapshots) ----"));
    assert!(result.contains_stdout("- Deleting vol-a-old"));
    assert!(result.contains_stdout("Keeping vol-a-day"));
    assert!(result.contains_stdout("- Deleting vol-a-dup"));
    assert!(result.contains_stdout("Keeping vol-a-new"));
    assert!(result.contains_stdout("  deleted: 2\n"));
    assert!(!result.contains_stdout("not really"));

    assert_eq!(env.inventory_ids()?, ["vol-a-day", "vol-a-new"]);
    assert!(
        result.duration < SMALL_RUN_BUDGET,
        "run took {:?}",
        result.duration
    );
    Ok(())
}

#[test]
fn test_second_run_is_stable() -> Result<()> {
    let env = TestEnv::new(&volumes_config(r#"["vol-a"]"#), daily_history("vol-a"))?;

    env.run(&[]).assert_success()?;
    let second = env.run(&[]).assert_success()?;

    assert!(second.contains_stdout("(2 snapshots)"));
    assert!(second.contains_stdout("  deleted: 0\n"));
    assert_eq!(env.inventory_ids()?, ["vol-a-day", "vol-a-new"]);
    Ok(())
}

#[test]
fn test_volumes_are_independent_groups() -> Result<()> {
    let mut snapshots = daily_history("vol-a");
    snapshots.push(snapshot("vol-b-only", "vol-b", "2024-05-01T00:00:00Z"));
    let env = TestEnv::new(&volumes_config(r#"["vol-a", "vol-b"]"#), snapshots)?;

    let result = env.run(&[]).assert_success()?;

    // A lone ancient snapshot is the newest of its group
    assert!(result.contains_stdout("will never delete newest snapshot"));
    assert_eq!(env.inventory_ids()?, ["vol-a-day", "vol-a-new", "vol-b-only"]);
    Ok(())
}

#[test]
fn test_all_volumes_form_one_group() -> Result<()> {
    let mut snapshots = daily_history("vol-a");
    snapshots.push(snapshot("vol-b-day", "vol-b", "2024-06-13T12:00:00Z"));
    let env = TestEnv::new(&volumes_config(r#"["all"]"#), snapshots)?;

    let result = env.run(&["--json"]).assert_success()?;
    let json = result.json()?;

    let group = &json["groups"][0];
    assert_eq!(group["group_id"], "all");
    assert_eq!(group["decisions"].as_array().map(Vec::len), Some(5));
    assert_eq!(group["report"]["deleted_count"], 3);
    assert_eq!(group["report"]["kept_count"], 2);
    assert_eq!(env.inventory_ids()?, ["vol-a-day", "vol-a-new"]);
    Ok(())
}

#[test]
fn test_json_summary() -> Result<()> {
    let env = TestEnv::new(&volumes_config(r#"["vol-a"]"#), daily_history("vol-a"))?;

    let result = env.run(&["--json", "--dry-run"]).assert_success()?;
    let json = result.json()?;

    assert_eq!(json["dry_run"], true);
    assert_eq!(json["now"], "2024-06-15T12:00:00+00:00");
    assert_eq!(json["groups"][0]["status"], "evaluated");
    assert_eq!(json["groups"][0]["region"], "us-east-1");

    let reasons: Vec<_> = json["groups"][0]["decisions"]
        .as_array()
        .into_iter()
        .flatten()
        .map(|d| d["reason"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(
        reasons,
        ["superseded", "first-in-bucket", "superseded", "within-hourly-window"]
    );
    Ok(())
}

#[test]
fn test_event_account_restricts_owner() -> Result<()> {
    let mut foreign = snapshot("foreign", "vol-a", "2024-06-13T09:00:00Z");
    foreign["owner_id"] = "222222222222".into();
    let mut snapshots = daily_history("vol-a");
    snapshots.insert(1, foreign);
    let env = TestEnv::new(&volumes_config(r#"["vol-a"]"#), snapshots)?;
    let event = env.write_file("event.json", r#"{"account": "111111111111"}"#)?;

    let event = event.to_string_lossy().to_string();
    env.run(&["--event", &event]).assert_success()?;

    assert_eq!(env.inventory_ids()?, ["foreign", "vol-a-day", "vol-a-new"]);
    Ok(())
}

#[test]
fn test_regions_are_evaluated_separately() -> Result<()> {
    let mut snapshots = daily_history("vol-a");
    let mut west = snapshot("west-1", "vol-a", "2024-06-14T01:00:00Z");
    west["region"] = "us-west-2".into();
    let mut west_dup = snapshot("west-2", "vol-a", "2024-06-14T02:00:00Z");
    west_dup["region"] = "us-west-2".into();
    snapshots.extend([west, west_dup]);

    let config = format!(
        "{}\n[run]\nregions = [\"us-east-1\", \"us-west-2\"]\n",
        volumes_config(r#"["vol-a"]"#)
    );
    let env = TestEnv::new(&config, snapshots)?;

    let result = env.run(&["--json"]).assert_success()?;
    let json = result.json()?;

    assert_eq!(json["groups"][0]["region"], "us-east-1");
    assert_eq!(json["groups"][1]["region"], "us-west-2");
    // The newest snapshot of us-west-2 is kept even though it shares a day
    assert_eq!(json["groups"][1]["report"]["kept_count"], 2);
    assert_eq!(
        env.inventory_ids()?,
        ["vol-a-day", "vol-a-new", "west-1", "west-2"]
    );
    Ok(())
}
