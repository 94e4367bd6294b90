//! Retention policy declaration and derived tier boundaries

use crate::calendar;
use crate::ConfigError;
use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Declared retention parameters, as written in configuration
///
/// Horizons are signed so that a negative value survives parsing and is
/// reported as a [`ConfigError`] instead of an opaque deserialization error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySpec {
    /// Hours during which ALL snapshots are kept
    #[serde(default)]
    pub hours: i64,
    /// Days during which ONE snapshot per day is kept
    #[serde(default)]
    pub days: i64,
    /// Weeks during which ONE snapshot per week is kept
    #[serde(default)]
    pub weeks: i64,
    /// Months during which ONE snapshot per month is kept
    #[serde(default)]
    pub months: i64,
    /// IANA timezone used for day/week/month boundaries
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Truncate "now" to the start of its hour (default: true)
    #[serde(default = "default_floor_now")]
    pub floor_now_to_hour: bool,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_floor_now() -> bool {
    true
}

impl Default for PolicySpec {
    fn default() -> Self {
        Self {
            hours: 0,
            days: 0,
            weeks: 0,
            months: 0,
            timezone: default_timezone(),
            floor_now_to_hour: default_floor_now(),
        }
    }
}

impl PolicySpec {
    /// Policy with the given horizons and default timezone/granularity
    pub fn new(hours: i64, days: i64, weeks: i64, months: i64) -> Self {
        Self {
            hours,
            days,
            weeks,
            months,
            ..Self::default()
        }
    }

    /// Override the timezone
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// Override "now" granularity
    pub fn with_floor_now_to_hour(mut self, floor: bool) -> Self {
        self.floor_now_to_hour = floor;
        self
    }
}

/// Validated policy for one run
///
/// Derived boundaries are computed once in [`PolicyConfig::new`] and never
/// change afterwards:
/// - `weekly_tier_start  = hours + days * 24` hours
/// - `monthly_tier_start = weekly_tier_start + weeks * 24 * 7` hours
/// - `retention_horizon  = (now - monthly_tier_start) - months` calendar months
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyConfig {
    hours: u32,
    days: u32,
    weeks: u32,
    months: u32,
    timezone: Tz,
    now: DateTime<Tz>,
    dry_run: bool,
    hourly_window: TimeDelta,
    weekly_tier_start: TimeDelta,
    monthly_tier_start: TimeDelta,
    retention_horizon: DateTime<Tz>,
}

impl PolicyConfig {
    /// Validate `spec` and derive the tier boundaries relative to `now`
    pub fn new(spec: &PolicySpec, now: DateTime<Utc>, dry_run: bool) -> Result<Self, ConfigError> {
        let hours = non_negative("hours", spec.hours)?;
        let days = non_negative("days", spec.days)?;
        let weeks = non_negative("weeks", spec.weeks)?;
        let months = non_negative("months", spec.months)?;

        let timezone = calendar::parse_timezone(&spec.timezone)?;
        let local_now = now.with_timezone(&timezone);
        let now = if spec.floor_now_to_hour {
            calendar::floor_to_hour(local_now)
        } else {
            local_now
        };

        // All in whole hours; u32 inputs cannot overflow i64 here
        let weekly_start_hours = i64::from(hours) + i64::from(days) * 24;
        let monthly_start_hours = weekly_start_hours + i64::from(weeks) * 24 * 7;

        let hourly_window = hours_delta("hours", spec.hours, i64::from(hours))?;
        let weekly_tier_start = hours_delta("days", spec.days, weekly_start_hours)?;
        let monthly_tier_start = hours_delta("weeks", spec.weeks, monthly_start_hours)?;

        let retention_horizon = now
            .checked_sub_signed(monthly_tier_start)
            .and_then(|t| calendar::sub_months(t, months))
            .ok_or(ConfigError::HorizonOutOfRange)?;

        Ok(Self {
            hours,
            days,
            weeks,
            months,
            timezone,
            now,
            dry_run,
            hourly_window,
            weekly_tier_start,
            monthly_tier_start,
            retention_horizon,
        })
    }

    /// Keep-all horizon in hours
    pub fn hours(&self) -> u32 {
        self.hours
    }

    /// Daily thinning horizon in days
    pub fn days(&self) -> u32 {
        self.days
    }

    /// Weekly thinning horizon in weeks
    pub fn weeks(&self) -> u32 {
        self.weeks
    }

    /// Monthly thinning horizon in calendar months
    pub fn months(&self) -> u32 {
        self.months
    }

    /// Timezone for calendar bucket boundaries
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Reference instant of the run, in the policy timezone
    pub fn now(&self) -> DateTime<Tz> {
        self.now
    }

    /// Whether deletions are simulated
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Age up to which every snapshot is kept
    pub fn hourly_window(&self) -> TimeDelta {
        self.hourly_window
    }

    /// Age at which daily buckets give way to weekly buckets
    pub fn weekly_tier_start(&self) -> TimeDelta {
        self.weekly_tier_start
    }

    /// Age at which weekly buckets give way to monthly buckets
    pub fn monthly_tier_start(&self) -> TimeDelta {
        self.monthly_tier_start
    }

    /// Instant before which bucket membership no longer protects a snapshot
    pub fn retention_horizon(&self) -> DateTime<Tz> {
        self.retention_horizon
    }
}

fn non_negative(field: &'static str, value: i64) -> Result<u32, ConfigError> {
    if value < 0 {
        return Err(ConfigError::NegativeHorizon { field, value });
    }
    u32::try_from(value).map_err(|_| ConfigError::HorizonTooLarge { field, value })
}

fn hours_delta(field: &'static str, declared: i64, hours: i64) -> Result<TimeDelta, ConfigError> {
    TimeDelta::try_hours(hours).ok_or(ConfigError::HorizonTooLarge {
        field,
        value: declared,
    })
}
