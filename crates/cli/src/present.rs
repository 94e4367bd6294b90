//! Console and JSON rendering of a run

use crate::runner::{GroupOutcome, GroupStatus, RunSummary};
use crate::source::GroupSelector;
use owo_colors::{OwoColorize, Style};
use purge_core::{Action, Decision, PolicyConfig, Reason};
use std::io::{self, Write};

const NOT_REALLY: &str = " (not really)";
const RULE: &str = "-------------------------------------------";

/// Renders run results for humans
pub struct Presenter<'a> {
    policy: &'a PolicyConfig,
    color: bool,
}

impl<'a> Presenter<'a> {
    pub fn new(policy: &'a PolicyConfig, color: bool) -> Self {
        Self { policy, color }
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.color {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    fn not_really(&self) -> &'static str {
        if self.policy.dry_run() {
            NOT_REALLY
        } else {
            ""
        }
    }

    /// Full console output: every group, then the summary
    pub fn render(&self, out: &mut impl Write, summary: &RunSummary) -> io::Result<()> {
        for group in &summary.groups {
            self.render_group(out, group)?;
        }
        self.render_summary(out, summary)
    }

    /// Decisions of one group, or why it was skipped
    pub fn render_group(&self, out: &mut impl Write, group: &GroupOutcome) -> io::Result<()> {
        match &group.status {
            GroupStatus::Evaluated => {}
            GroupStatus::NoSnapshots => {
                let line = match &group.selector {
                    GroupSelector::Volume(id) => format!("No snapshots found with volume id: {id}"),
                    GroupSelector::AllVolumes => "No snapshots found for any volume".to_string(),
                    GroupSelector::Tags(_) => {
                        format!("No snapshots found with tags: {}", group.group_id)
                    }
                };
                return writeln!(out, "{} ({})", line, group.region);
            }
            GroupStatus::SourceFailed(error) => {
                let line = format!(
                    "Failed to list snapshots for {} in {}: {}",
                    group.group_id, group.region, error
                );
                return writeln!(out, "{}", self.paint(&line, Style::new().red()));
            }
            GroupStatus::InvalidInput(error) => {
                let line = format!("Skipping {} in {}: {}", group.group_id, group.region, error);
                return writeln!(out, "{}", self.paint(&line, Style::new().red()));
            }
        }

        let header = format!(
            "---- RESULTS FOR {} ({} snapshots) ----",
            group.group_id,
            group.decisions.len()
        );
        writeln!(out, "{}", self.paint(&header, Style::new().bold()))?;

        for decision in &group.decisions {
            let line = self.decision_line(decision);
            let style = match decision.action {
                Action::Keep => Style::new().green(),
                Action::Delete => Style::new().yellow(),
            };
            writeln!(out, "{}", self.paint(&line, style))?;
        }

        for failed in &group.failed_deletions {
            let line = format!("! Failed to delete {}: {}", failed.snapshot_id, failed.error);
            writeln!(out, "{}", self.paint(&line, Style::new().red().bold()))?;
        }
        writeln!(out)
    }

    /// One line per decision
    pub fn decision_line(&self, decision: &Decision) -> String {
        let local = decision
            .started_at
            .with_timezone(&self.policy.timezone())
            .format("%Y-%m-%d %H:%M:%S%:z");
        let hours = decision.age_seconds / 3600;
        let days = decision.age_seconds / 86_400;
        let id = &decision.snapshot_id;

        match (decision.reason, decision.bucket) {
            (Reason::FirstInBucket, Some(bucket)) => format!(
                "Keeping {id}: {local}, {days} days old - {} of {bucket}",
                bucket.tier().period()
            ),
            (Reason::NewestNeverDeleted, _) => format!(
                "Keeping {id}: {local}, {hours} hours old - will never delete newest snapshot"
            ),
            (Reason::Superseded, _) => format!(
                "- Deleting{} {id}: {local}, {days} days old",
                self.not_really()
            ),
            _ => format!(
                "Keeping {id}: {local}, {hours} hours old - {}-hour threshold",
                self.policy.hours()
            ),
        }
    }

    /// Per-group deleted/kept counts
    pub fn render_summary(&self, out: &mut impl Write, summary: &RunSummary) -> io::Result<()> {
        writeln!(out, "\n{}\n", self.paint("SUMMARY:", Style::new().bold()))?;
        for group in summary
            .groups
            .iter()
            .filter(|g| g.status == GroupStatus::Evaluated)
        {
            writeln!(out, "{} ({}):", group.group_id, group.region)?;
            writeln!(
                out,
                "  deleted: {}{}",
                group.report.deleted_count,
                self.not_really()
            )?;
            writeln!(out, "  kept:    {}", group.report.kept_count)?;
            writeln!(out, "{RULE}\n")?;
        }

        let failed = summary.failed_groups();
        if failed > 0 {
            let line = format!("{failed} of {} groups did not complete cleanly", summary.groups.len());
            writeln!(out, "{}", self.paint(&line, Style::new().red().bold()))?;
        }
        Ok(())
    }
}

/// Machine-readable output
pub fn render_json(out: &mut impl Write, summary: &RunSummary) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(&mut *out, summary)?;
    writeln!(out).map_err(serde_json::Error::io)
}
