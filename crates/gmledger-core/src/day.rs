//! Calendar-day resolution.
//!
//! Every "today" decision in the ledger goes through a [`Clock`], and every
//! day is a [`CalendarDay`] derived from the clock's local wall time. Day
//! strings use the ISO `YYYY-MM-DD` form.

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::str::FromStr;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// A local calendar date, the unit of streak and gate bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDay(NaiveDate);

/// Error returned when a day string is not a valid ISO date.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid calendar day '{raw}': expected YYYY-MM-DD")]
pub struct DayParseError {
    /// The rejected input.
    pub raw: String,
}

impl CalendarDay {
    /// Wrap a date.
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Build from year/month/day, `None` if the date does not exist.
    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// The local calendar day of a timestamp, using the timestamp's own offset.
    #[must_use]
    pub fn of(ts: &DateTime<FixedOffset>) -> Self {
        Self(ts.date_naive())
    }

    /// Underlying date.
    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }

    /// The day `n` days after this one (negative moves backwards).
    #[must_use]
    pub fn offset_days(self, n: i64) -> Self {
        Self(self.0 + Duration::days(n))
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}

impl FromStr for CalendarDay {
    type Err = DayParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), DAY_FORMAT)
            .map(Self)
            .map_err(|_| DayParseError { raw: s.to_string() })
    }
}

// Serialized as the bare day string so it also works as a JSON map key.
impl Serialize for CalendarDay {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDay {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Source of wall-clock time.
pub trait Clock {
    /// Current wall time carrying the local UTC offset.
    fn now(&self) -> DateTime<FixedOffset>;

    /// Current local calendar day.
    fn today(&self) -> CalendarDay {
        CalendarDay::of(&self.now())
    }
}

impl<T: Clock + ?Sized> Clock for Box<T> {
    fn now(&self) -> DateTime<FixedOffset> {
        (**self).now()
    }
}

/// The host's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A manually driven clock for tests and replays.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<DateTime<FixedOffset>>,
}

impl FixedClock {
    /// Start the clock at `now`.
    #[must_use]
    pub const fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    /// Jump to an absolute instant.
    pub fn set(&self, now: DateTime<FixedOffset>) {
        self.now.set(now);
    }

    /// Move forward (or backward) by a duration.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Move forward by whole days, keeping the time of day.
    pub fn advance_days(&self, days: i64) {
        self.advance(Duration::days(days));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.now.get()
    }
}
