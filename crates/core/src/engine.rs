//! Keep/delete walk over one group's snapshots
//!
//! The walk visits snapshots oldest first. Outside the hourly window, the
//! first snapshot seen in each calendar bucket is kept and later ones in the
//! same bucket are deleted. Because ages only shrink as the walk advances,
//! tiers are visited monthly -> weekly -> daily -> hourly and a single
//! "last kept bucket" is enough to track all of them.

use crate::tier::{classify, BucketKey, Tier};
use crate::{InputError, PolicyConfig, Snapshot};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What to do with a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Keep,
    Delete,
}

/// Why a snapshot got its action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Reason {
    /// Younger than the keep-all window
    WithinHourlyWindow,
    /// Oldest snapshot of a bucket not yet represented
    FirstInBucket,
    /// Would be deleted, but is the newest snapshot of the group
    NewestNeverDeleted,
    /// Bucket already represented, or older than the retention horizon
    Superseded,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Reason::WithinHourlyWindow => "within-hourly-window",
            Reason::FirstInBucket => "first-in-bucket",
            Reason::NewestNeverDeleted => "newest-never-deleted",
            Reason::Superseded => "superseded",
        };
        f.write_str(s)
    }
}

/// Verdict for one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub snapshot_id: String,
    pub started_at: DateTime<Utc>,
    /// Age relative to the policy's "now", in whole seconds
    pub age_seconds: i64,
    pub tier: Tier,
    pub bucket: Option<BucketKey>,
    pub action: Action,
    pub reason: Reason,
}

impl Decision {
    /// Whether the snapshot survives this run
    pub fn is_keep(&self) -> bool {
        self.action == Action::Keep
    }

    /// Age relative to the policy's "now"
    pub fn age(&self) -> TimeDelta {
        TimeDelta::seconds(self.age_seconds)
    }
}

/// Applies a [`PolicyConfig`] to sorted snapshot sequences
///
/// Stateless between calls: every `walk`/`run` starts with no bucket kept.
#[derive(Debug, Clone, Copy)]
pub struct RetentionEngine<'p> {
    policy: &'p PolicyConfig,
}

impl<'p> RetentionEngine<'p> {
    /// Create an engine for the given policy
    pub fn new(policy: &'p PolicyConfig) -> Self {
        Self { policy }
    }

    /// Validate `snapshots` and return a lazy decision stream
    ///
    /// `snapshots` must be non-empty and sorted ascending by start time
    /// (equal timestamps are allowed).
    pub fn walk<'s>(
        &self,
        group: &str,
        snapshots: &'s [Snapshot],
    ) -> Result<RetentionWalk<'p, 's>, InputError> {
        if snapshots.is_empty() {
            return Err(InputError::Empty {
                group: group.to_string(),
            });
        }

        if let Some(index) = snapshots
            .windows(2)
            .position(|w| w[1].started_at < w[0].started_at)
        {
            let index = index + 1;
            return Err(InputError::Unsorted {
                group: group.to_string(),
                index,
                snapshot_id: snapshots[index].id.clone(),
            });
        }

        Ok(RetentionWalk {
            policy: self.policy,
            horizon: self.policy.retention_horizon().with_timezone(&Utc),
            snapshots,
            position: 0,
            last_kept: None,
        })
    }

    /// Decide every snapshot of a group
    pub fn run(&self, group: &str, snapshots: &[Snapshot]) -> Result<Vec<Decision>, InputError> {
        Ok(self.walk(group, snapshots)?.collect())
    }
}

/// Iterator of decisions over one group, oldest snapshot first
#[derive(Debug, Clone)]
pub struct RetentionWalk<'p, 's> {
    policy: &'p PolicyConfig,
    horizon: DateTime<Utc>,
    snapshots: &'s [Snapshot],
    position: usize,
    last_kept: Option<BucketKey>,
}

impl<'p, 's> RetentionWalk<'p, 's> {
    /// Bucket of the most recently kept non-hourly snapshot
    pub fn last_kept(&self) -> Option<BucketKey> {
        self.last_kept
    }
}

impl Iterator for RetentionWalk<'_, '_> {
    type Item = Decision;

    fn next(&mut self) -> Option<Decision> {
        let snapshot = self.snapshots.get(self.position)?;
        self.position += 1;
        let is_newest = self.position == self.snapshots.len();

        let class = classify(snapshot.started_at, self.policy);

        let (action, reason) = match class.bucket {
            None => (Action::Keep, Reason::WithinHourlyWindow),
            Some(key) if self.last_kept != Some(key) && snapshot.started_at > self.horizon => {
                self.last_kept = Some(key);
                (Action::Keep, Reason::FirstInBucket)
            }
            Some(_) if is_newest => (Action::Keep, Reason::NewestNeverDeleted),
            Some(_) => (Action::Delete, Reason::Superseded),
        };

        Some(Decision {
            snapshot_id: snapshot.id.clone(),
            started_at: snapshot.started_at,
            age_seconds: class.age.num_seconds(),
            tier: class.tier,
            bucket: class.bucket,
            action,
            reason,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.snapshots.len() - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RetentionWalk<'_, '_> {}
