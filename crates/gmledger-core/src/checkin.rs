//! Derived check-in analytics: streak, day history and points.
//!
//! # Invariants
//!
//! - `total_points == pointsByDay.values().sum()`; the total is recomputed
//!   from the map on every update, never incremented.
//! - `history` holds each day at most once, in the order it was first
//!   checked in.
//! - The first check-in of a day fixes that day's points; repeats on the
//!   same day leave them alone.
//! - `streak` grows by one on every check-in whose day differs from
//!   `last_check_in_day`. Gaps between days are not detected.

use crate::day::CalendarDay;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Days in one streak milestone cycle.
pub const WEEK_LEN: u32 = 7;

/// Streak and points summary derived from check-in events.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInAggregate {
    pub streak: u32,
    #[serde(default)]
    pub last_check_in_day: Option<CalendarDay>,
    #[serde(default)]
    pub history: Vec<CalendarDay>,
    #[serde(default)]
    pub points_by_day: BTreeMap<CalendarDay, u32>,
    #[serde(default)]
    pub total_points: u64,
}

impl CheckInAggregate {
    /// Fold one check-in on `day` worth `points` into a new aggregate.
    ///
    /// The receiver is untouched; callers swap the returned value in whole.
    #[must_use]
    pub fn with_check_in(&self, day: CalendarDay, points: u32) -> Self {
        let is_new_day = self.last_check_in_day != Some(day);

        let streak = if is_new_day {
            self.streak.saturating_add(1)
        } else {
            self.streak
        };

        let mut history = self.history.clone();
        if is_new_day && !history.contains(&day) {
            history.push(day);
        }

        let mut points_by_day = self.points_by_day.clone();
        if is_new_day || !points_by_day.contains_key(&day) {
            points_by_day.insert(day, points);
        }

        let total_points = sum_points(&points_by_day);

        Self {
            streak,
            last_check_in_day: Some(day),
            history,
            points_by_day,
            total_points,
        }
    }

    /// Whether the most recent check-in happened on `day`.
    #[must_use]
    pub fn checked_in_on(&self, day: CalendarDay) -> bool {
        self.last_check_in_day == Some(day)
    }

    /// Whether any check-in was ever recorded on `day`.
    #[must_use]
    pub fn history_contains(&self, day: CalendarDay) -> bool {
        self.history.contains(&day)
    }

    /// Points earned on `day`, if any check-in happened then.
    #[must_use]
    pub fn points_on(&self, day: CalendarDay) -> Option<u32> {
        self.points_by_day.get(&day).copied()
    }

    /// Progress through the current seven-day cycle, in `[0, 1)`.
    #[must_use]
    pub fn weekly_progress(&self) -> f64 {
        f64::from(self.streak % WEEK_LEN) / f64::from(WEEK_LEN)
    }

    /// Check-in days left until the next seven-day milestone, in `1..=7`.
    #[must_use]
    pub const fn days_to_weekly_goal(&self) -> u32 {
        WEEK_LEN - self.streak % WEEK_LEN
    }

    /// Recompute `total_points` from `points_by_day`.
    ///
    /// Used after loading persisted state so a hand-edited or stale total
    /// cannot drift from the map.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.total_points = sum_points(&self.points_by_day);
        self
    }
}

fn sum_points(points_by_day: &BTreeMap<CalendarDay, u32>) -> u64 {
    points_by_day.values().map(|p| u64::from(*p)).sum()
}
