//! Per-region, per-group retention runs
//!
//! Groups are independent: each one is listed, walked and purged on its
//! own, and a failure in one group never stops the others.

use crate::config::Config;
use crate::sink::{DeletionSink, DryRunSink};
use crate::source::{GroupSelector, SnapshotSource};
use futures::stream::{self, StreamExt};
use purge_core::{Action, ConfigError, Decision, GroupReport, InputError, PolicyConfig, RetentionEngine};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn, Instrument};
use ulid::Ulid;

/// What to evaluate in one run
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub regions: Vec<String>,
    pub groups: Vec<GroupSelector>,
    /// Owner restriction passed to the source
    pub account: Option<String>,
    /// Groups evaluated at the same time
    pub concurrency: usize,
}

impl RunPlan {
    /// Build a plan from validated configuration
    pub fn from_config(config: &Config, account: Option<String>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            regions: config.run.regions.clone(),
            groups: config.selection.groups()?,
            account,
            concurrency: config.run.concurrency,
        })
    }

    /// Every (region, group) pair, region-major
    pub fn targets(&self) -> Vec<(String, GroupSelector)> {
        self.regions
            .iter()
            .flat_map(|region| {
                self.groups
                    .iter()
                    .map(move |group| (region.clone(), group.clone()))
            })
            .collect()
    }
}

/// How a group's evaluation ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "kebab-case")]
pub enum GroupStatus {
    /// Decisions computed (and deletions attempted)
    Evaluated,
    /// The source returned no snapshots
    NoSnapshots,
    /// The source returned a sequence the engine refuses
    InvalidInput(String),
    /// The source failed
    SourceFailed(String),
}

/// A deletion the sink refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDeletion {
    pub snapshot_id: String,
    pub error: String,
}

/// Result of one group
#[derive(Debug, Clone, Serialize)]
pub struct GroupOutcome {
    pub region: String,
    pub group_id: String,
    #[serde(skip)]
    pub selector: GroupSelector,
    #[serde(flatten)]
    pub status: GroupStatus,
    pub decisions: Vec<Decision>,
    pub report: GroupReport,
    pub failed_deletions: Vec<FailedDeletion>,
}

impl GroupOutcome {
    fn skipped(region: String, selector: GroupSelector, status: GroupStatus) -> Self {
        let group_id = selector.group_id();
        Self {
            region,
            report: GroupReport::new(group_id.clone()),
            group_id,
            selector,
            status,
            decisions: Vec::new(),
            failed_deletions: Vec::new(),
        }
    }

    /// Evaluated (or legitimately empty) with every deletion applied
    pub fn is_clean(&self) -> bool {
        matches!(self.status, GroupStatus::Evaluated | GroupStatus::NoSnapshots)
            && self.failed_deletions.is_empty()
    }
}

/// Result of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Ulid,
    /// Effective "now", RFC 3339 in the policy timezone
    pub now: String,
    pub dry_run: bool,
    pub groups: Vec<GroupOutcome>,
}

impl RunSummary {
    /// Groups that did not complete cleanly
    pub fn failed_groups(&self) -> usize {
        self.groups.iter().filter(|g| !g.is_clean()).count()
    }

    /// Whether any group failed
    pub fn has_failures(&self) -> bool {
        self.failed_groups() > 0
    }
}

/// Drives the retention engine over every planned group
pub struct Runner {
    policy: Arc<PolicyConfig>,
    source: Arc<dyn SnapshotSource>,
    sink: Arc<dyn DeletionSink>,
    plan: RunPlan,
}

impl Runner {
    /// Create a runner
    ///
    /// In dry-run mode `sink` is replaced with [`DryRunSink`]; decisions and
    /// counts are unaffected.
    pub fn new(
        policy: Arc<PolicyConfig>,
        source: Arc<dyn SnapshotSource>,
        sink: Arc<dyn DeletionSink>,
        plan: RunPlan,
    ) -> Self {
        let sink: Arc<dyn DeletionSink> = if policy.dry_run() {
            Arc::new(DryRunSink)
        } else {
            sink
        };
        Self {
            policy,
            source,
            sink,
            plan,
        }
    }

    /// Evaluate every group; results come back in plan order
    pub async fn run(&self) -> RunSummary {
        let run_id = Ulid::new();
        let span = tracing::info_span!("purge", %run_id, dry_run = self.policy.dry_run());
        let targets = self.plan.targets();

        let groups = async {
            info!(
                groups = targets.len(),
                now = %self.policy.now(),
                horizon = %self.policy.retention_horizon(),
                "Starting retention run"
            );
            stream::iter(targets)
                .map(|(region, selector)| self.run_group(region, selector))
                .buffered(self.plan.concurrency.max(1))
                .collect::<Vec<_>>()
                .await
        }
        .instrument(span)
        .await;

        RunSummary {
            run_id,
            now: self.policy.now().to_rfc3339(),
            dry_run: self.policy.dry_run(),
            groups,
        }
    }

    async fn run_group(&self, region: String, selector: GroupSelector) -> GroupOutcome {
        let group_id = selector.group_id();

        // 1. List snapshots
        let snapshots = match self
            .source
            .snapshots(&region, self.plan.account.as_deref(), &selector)
            .await
        {
            Ok(snapshots) => snapshots,
            Err(e) => {
                warn!(%region, group = %group_id, error = %e, "Failed to list snapshots, skipping group");
                return GroupOutcome::skipped(region, selector, GroupStatus::SourceFailed(e.to_string()));
            }
        };

        // 2. Decide
        let engine = RetentionEngine::new(&self.policy);
        let decisions = match engine.run(&group_id, &snapshots) {
            Ok(decisions) => decisions,
            Err(InputError::Empty { .. }) => {
                info!(%region, group = %group_id, "No snapshots found");
                return GroupOutcome::skipped(region, selector, GroupStatus::NoSnapshots);
            }
            Err(e) => {
                warn!(%region, group = %group_id, error = %e, "Invalid snapshot sequence, skipping group");
                return GroupOutcome::skipped(region, selector, GroupStatus::InvalidInput(e.to_string()));
            }
        };
        let report = GroupReport::from_decisions(group_id.clone(), &decisions);

        // 3. Apply deletions, continuing past failures
        let mut failed_deletions = Vec::new();
        for decision in &decisions {
            debug!(
                snapshot = %decision.snapshot_id,
                tier = %decision.tier,
                action = ?decision.action,
                reason = %decision.reason,
                "Decided"
            );
            if decision.action != Action::Delete {
                continue;
            }
            if let Err(e) = self.sink.delete(&region, &decision.snapshot_id).await {
                warn!(%region, snapshot = %decision.snapshot_id, error = %e, "Failed to delete snapshot");
                failed_deletions.push(FailedDeletion {
                    snapshot_id: decision.snapshot_id.clone(),
                    error: e.to_string(),
                });
            }
        }

        info!(
            %region,
            group = %group_id,
            deleted = report.deleted_count,
            kept = report.kept_count,
            failed = failed_deletions.len(),
            "Group evaluated"
        );

        GroupOutcome {
            region,
            group_id,
            selector,
            status: GroupStatus::Evaluated,
            decisions,
            report,
            failed_deletions,
        }
    }
}
