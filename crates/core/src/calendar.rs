//! Calendar arithmetic in the policy timezone

use crate::ConfigError;
use chrono::{
    DateTime, Datelike, LocalResult, Months, NaiveDate, NaiveDateTime, TimeDelta, TimeZone,
    Timelike, Weekday,
};
use chrono_tz::Tz;

/// First day of a calendar week for weekly buckets
pub const WEEK_START: Weekday = Weekday::Sun;

/// Parse an IANA timezone name
pub fn parse_timezone(name: &str) -> Result<Tz, ConfigError> {
    name.parse::<Tz>().map_err(|e| ConfigError::InvalidTimezone {
        timezone: name.to_string(),
        message: e.to_string(),
    })
}

/// Truncate an instant to the start of its local hour
pub fn floor_to_hour(instant: DateTime<Tz>) -> DateTime<Tz> {
    let secs_into_hour =
        i64::from(instant.minute()) * 60 + i64::from(instant.second());
    let truncated = instant - TimeDelta::seconds(secs_into_hour);
    truncated.with_nanosecond(0).unwrap_or(truncated)
}

/// Start-of-week date for the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = (date.weekday().num_days_from_monday() + 7
        - WEEK_START.num_days_from_monday())
        % 7;
    date - TimeDelta::days(i64::from(offset))
}

/// Subtract calendar months, clamping the day to the target month's length
///
/// Works on local wall-clock time so that "one month before 10:00" is
/// 10:00 again, whatever DST did in between.
pub fn sub_months(instant: DateTime<Tz>, months: u32) -> Option<DateTime<Tz>> {
    let local = instant.naive_local().checked_sub_months(Months::new(months))?;
    resolve_local(&instant.timezone(), local)
}

/// Map a local wall-clock time back onto the timeline
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant; times
/// inside a DST gap are pushed forward by one hour.
fn resolve_local(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => tz
            .from_local_datetime(&(local + TimeDelta::hours(1)))
            .earliest(),
    }
}
