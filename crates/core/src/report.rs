//! Per-group keep/delete tallies

use crate::{Action, Decision};
use serde::{Deserialize, Serialize};

/// Keep/delete counts for one group
///
/// Dry-run deletions count as deleted: a dry run reports exactly what a
/// live run would do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupReport {
    pub group_id: String,
    pub deleted_count: usize,
    pub kept_count: usize,
}

impl GroupReport {
    /// Empty report for a group
    pub fn new(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            deleted_count: 0,
            kept_count: 0,
        }
    }

    /// Fold a decision stream into a report
    pub fn from_decisions<'a>(
        group_id: impl Into<String>,
        decisions: impl IntoIterator<Item = &'a Decision>,
    ) -> Self {
        let mut report = Self::new(group_id);
        for decision in decisions {
            report.record(decision);
        }
        report
    }

    /// Count one decision
    pub fn record(&mut self, decision: &Decision) {
        match decision.action {
            Action::Keep => self.kept_count += 1,
            Action::Delete => self.deleted_count += 1,
        }
    }

    /// Total snapshots seen
    pub fn total(&self) -> usize {
        self.deleted_count + self.kept_count
    }
}
