//! Tag-selected groups

use crate::common::{snapshot, TestEnv, SHORT_POLICY};
use anyhow::Result;
use serde_json::{json, Value};

fn tagged(id: &str, volume: &str, start_time: &str, tags: Value) -> Value {
    let mut snap = snapshot(id, volume, start_time);
    snap["tags"] = tags;
    snap
}

fn tags_config(tags: &str) -> String {
    format!("{SHORT_POLICY}\n[selection]\ntags = {tags}\n")
}

#[test]
fn test_tag_selection_spans_volumes() -> Result<()> {
    let prod = json!({ "env": "prod", "team": "db" });
    let snapshots = vec![
        tagged("p1", "vol-a", "2024-06-13T08:00:00Z", prod.clone()),
        tagged("p2", "vol-b", "2024-06-13T09:00:00Z", prod.clone()),
        tagged("dev", "vol-c", "2024-06-13T10:00:00Z", json!({ "env": "dev" })),
        tagged("p3", "vol-a", "2024-06-15T11:00:00Z", prod),
    ];
    let env = TestEnv::new(&tags_config(r#"{ team = "db", env = "prod" }"#), snapshots)?;

    let result = env.run(&[]).assert_success()?;

    assert!(result.contains_stdout("---- RESULTS FOR env=prod team=db (3 snapshots) ----"));
    assert!(result.contains_stdout("Keeping p1"));
    assert!(result.contains_stdout("- Deleting p2"));
    assert_eq!(env.inventory_ids()?, ["p1", "dev", "p3"]);
    Ok(())
}

#[test]
fn test_no_tag_match_is_not_an_error() -> Result<()> {
    let snapshots = vec![tagged(
        "dev",
        "vol-c",
        "2024-06-13T10:00:00Z",
        json!({ "env": "dev" }),
    )];
    let env = TestEnv::new(&tags_config(r#"{ env = "prod" }"#), snapshots)?;

    let result = env.run(&[]).assert_success()?;

    assert!(result.contains_stdout("No snapshots found with tags: env=prod"));
    assert_eq!(env.inventory_ids()?, ["dev"]);
    Ok(())
}
