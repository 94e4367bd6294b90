//! Aging tiers and their calendar buckets

use crate::calendar;
use crate::PolicyConfig;
use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aging class of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Within the keep-all window
    Hourly,
    /// One snapshot per calendar day
    Daily,
    /// One snapshot per calendar week
    Weekly,
    /// One snapshot per calendar month
    Monthly,
}

impl Tier {
    /// Calendar period a bucket of this tier spans
    pub fn period(&self) -> &'static str {
        match self {
            Tier::Hourly => "hour",
            Tier::Daily => "day",
            Tier::Weekly => "week",
            Tier::Monthly => "month",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Hourly => "hourly",
            Tier::Daily => "daily",
            Tier::Weekly => "weekly",
            Tier::Monthly => "monthly",
        };
        f.write_str(name)
    }
}

/// Calendar bucket a snapshot falls into, tagged by tier
///
/// Every variant holds the first local date of its period. Keys of
/// different tiers never compare equal, even when the dates match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "period", content = "start", rename_all = "lowercase")]
pub enum BucketKey {
    Day(NaiveDate),
    Week(NaiveDate),
    Month(NaiveDate),
}

impl BucketKey {
    /// Tier this key belongs to
    pub fn tier(&self) -> Tier {
        match self {
            BucketKey::Day(_) => Tier::Daily,
            BucketKey::Week(_) => Tier::Weekly,
            BucketKey::Month(_) => Tier::Monthly,
        }
    }

    /// First local date of the bucket's period
    pub fn start(&self) -> NaiveDate {
        match *self {
            BucketKey::Day(d) | BucketKey::Week(d) | BucketKey::Month(d) => d,
        }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Day(d) | BucketKey::Week(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            BucketKey::Month(d) => write!(f, "{}", d.format("%Y-%m")),
        }
    }
}

/// Result of classifying one snapshot timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub tier: Tier,
    /// `None` for the hourly tier, which is never thinned
    pub bucket: Option<BucketKey>,
    /// Age relative to the policy's "now", never negative
    pub age: TimeDelta,
}

/// Determine the tier and bucket of a snapshot taken at `started_at`
///
/// A timestamp after "now" (clock skew) has age zero and is hourly.
pub fn classify(started_at: DateTime<Utc>, policy: &PolicyConfig) -> Classification {
    let local = started_at.with_timezone(&policy.timezone());
    let age = (policy.now() - local).max(TimeDelta::zero());
    let date = local.date_naive();

    let (tier, bucket) = if age <= policy.hourly_window() {
        (Tier::Hourly, None)
    } else if age <= policy.weekly_tier_start() {
        (Tier::Daily, Some(BucketKey::Day(date)))
    } else if age <= policy.monthly_tier_start() {
        (Tier::Weekly, Some(BucketKey::Week(calendar::week_start(date))))
    } else {
        let first_of_month = date - TimeDelta::days(i64::from(date.day0()));
        (Tier::Monthly, Some(BucketKey::Month(first_of_month)))
    };

    Classification { tier, bucket, age }
}
