//! Wall clock and accounting periods
//!
//! Period boundaries are computed in the business's local time (a fixed UTC
//! offset) and converted back to UTC, so a record stamped at 23:30 local time
//! never leaks into the next day's totals.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Seconds in one accounting day
pub const SECONDS_PER_DAY: i64 = 86_400;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Source of "now" plus the local offset used for period boundaries
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;

    /// Local offset of the business
    fn local_offset(&self) -> FixedOffset;
}

/// Clock backed by the operating system
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    /// System clock with local time equal to UTC
    pub fn utc() -> Self {
        Self { offset: utc_offset() }
    }

    /// System clock with a fixed local offset in minutes east of UTC
    pub fn with_offset_minutes(minutes: i32) -> Self {
        Self { offset: offset_from_minutes(minutes) }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::utc()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_offset(&self) -> FixedOffset {
        self.offset
    }
}

/// Settable clock for tests and replays
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
    offset: FixedOffset,
}

impl ManualClock {
    /// Clock frozen at `now`, local time equal to UTC
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
            offset: utc_offset(),
        }
    }

    /// Clock frozen at `now` with a local offset in minutes east of UTC
    pub fn with_offset_minutes(now: DateTime<Utc>, minutes: i32) -> Self {
        Self {
            now: RwLock::new(now),
            offset: offset_from_minutes(minutes),
        }
    }

    /// Jump to a new instant
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write() = now;
    }

    /// Move forward (or backward, with a negative duration)
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }

    fn local_offset(&self) -> FixedOffset {
        self.offset
    }
}

/// Revenue aggregation period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Since local midnight
    Day,
    /// Since the most recent Sunday 00:00
    Week,
    /// Since the first of the current month 00:00
    Month,
}

impl Period {
    /// All periods, shortest first
    pub const ALL: [Period; 3] = [Period::Day, Period::Week, Period::Month];
}

/// First instant of `period` containing `now`, as seen from `offset`
///
/// Weeks start on Sunday.
pub fn period_start(period: Period, now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let today = now.with_timezone(&offset).date_naive();
    let first_day = match period {
        Period::Day => today,
        Period::Week => today - Duration::days(i64::from(today.weekday().num_days_from_sunday())),
        Period::Month => today - Duration::days(i64::from(today.day0())),
    };
    local_midnight(first_day, offset)
}

/// Fractional days elapsed from `earlier` to `later`
pub fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// `days` whole days as a duration
pub fn days(days: i64) -> Duration {
    Duration::seconds(days * SECONDS_PER_DAY)
}

fn local_midnight(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    let utc = midnight - Duration::seconds(i64::from(offset.local_minus_utc()));
    Utc.from_utc_datetime(&utc)
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

/// Fixed offset `minutes` east of UTC
pub fn offset_from_minutes(minutes: i32) -> FixedOffset {
    // Out-of-range offsets (beyond ±24h) fall back to UTC
    FixedOffset::east_opt(minutes.saturating_mul(60)).unwrap_or_else(utc_offset)
}
