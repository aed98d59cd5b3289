//! Event data model for the activity log.
//!
//! An [`ActivityEvent`] is one confirmed user action. Events are appended
//! by the ledger and never mutated afterwards; aggregates are derived from
//! them instead.
//!
//! # JSON shape
//!
//! ```text
//! {"id":1760868000000,"kind":"check-in","occurredAt":"2026-10-19T09:00:00+02:00",
//!  "calendarDay":"2026-10-19","points":42,"status":"Confirmed",
//!  "externalRef":"0xabc","title":"Daily Streak Maintained"}
//! ```
//!
//! Display attributes are flattened next to the fixed fields.

pub mod details;
pub mod types;

pub use details::{Details, RESERVED_KEYS};
pub use types::{ActivityKind, UnknownActivityKind};

use crate::day::CalendarDay;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Lifecycle status of a recorded event.
///
/// Callers record only after on-chain confirmation, so there is no pending
/// state at this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ActivityStatus {
    #[default]
    Confirmed,
}

/// A single entry in the activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    /// Millisecond timestamp id, strictly increasing within one log.
    pub id: u64,

    /// What the user did.
    pub kind: ActivityKind,

    /// Wall-clock time of recording, with the local offset.
    pub occurred_at: DateTime<FixedOffset>,

    /// Local calendar day of `occurred_at`.
    pub calendar_day: CalendarDay,

    /// Reward points; non-zero only for check-ins.
    pub points: u32,

    #[serde(default)]
    pub status: ActivityStatus,

    /// Opaque cross-reference into an external ledger (e.g. a tx hash).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<String>,

    /// Display attributes supplied by the caller.
    #[serde(flatten)]
    pub details: BTreeMap<String, Value>,
}

impl ActivityEvent {
    /// Look up a display attribute.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }

    /// The `title` attribute when it is a string.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.attribute("title").and_then(Value::as_str)
    }

    /// The `text` attribute when it is a string.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.attribute("text").and_then(Value::as_str)
    }

    /// The `amount` attribute when it is a string.
    #[must_use]
    pub fn amount(&self) -> Option<&str> {
        self.attribute("amount").and_then(Value::as_str)
    }
}
