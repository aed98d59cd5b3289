//! Monday-first week strip and the midnight reset countdown.

use crate::checkin::CheckInAggregate;
use crate::day::CalendarDay;
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime};
use serde::Serialize;

/// State of one day in the week strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum SlotState {
    /// Before today, with a check-in on record.
    Completed,
    /// Before today, no check-in.
    Missed,
    /// Today.
    Today { checked_in: bool },
    /// After today.
    Upcoming,
}

/// One day of the week strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DaySlot {
    pub day: CalendarDay,
    pub weekday: &'static str,
    #[serde(flatten)]
    pub state: SlotState,
}

/// The seven days (Monday to Sunday) of the week containing a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekView {
    pub slots: [DaySlot; 7],
}

const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

impl WeekView {
    /// Lay out the week containing `today` against `aggregate`'s history.
    #[must_use]
    pub fn for_day(today: CalendarDay, aggregate: &CheckInAggregate) -> Self {
        let offset = i64::from(today.date().weekday().num_days_from_monday());
        let monday = today.offset_days(-offset);

        let slots = std::array::from_fn(|idx| {
            let day = monday.offset_days(i64::try_from(idx).unwrap_or_default());
            let state = match day.cmp(&today) {
                std::cmp::Ordering::Less if aggregate.history_contains(day) => SlotState::Completed,
                std::cmp::Ordering::Less => SlotState::Missed,
                std::cmp::Ordering::Equal => SlotState::Today {
                    checked_in: aggregate.checked_in_on(day),
                },
                std::cmp::Ordering::Greater => SlotState::Upcoming,
            };
            DaySlot {
                day,
                weekday: WEEKDAY_LABELS[idx],
                state,
            }
        });

        Self { slots }
    }

    /// Number of completed past days plus today if checked in.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| {
                matches!(
                    s.state,
                    SlotState::Completed | SlotState::Today { checked_in: true }
                )
            })
            .count()
    }
}

/// Time left until the next local midnight, when the daily gates reopen.
#[must_use]
pub fn time_until_reset(now: &DateTime<FixedOffset>) -> Duration {
    let tomorrow = now.date_naive() + Duration::days(1);
    let midnight = tomorrow.and_time(NaiveTime::MIN);
    midnight - now.naive_local()
}

/// Render a non-negative duration as `HH:MM:SS`.
#[must_use]
pub fn format_countdown(remaining: Duration) -> String {
    let total = remaining.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
