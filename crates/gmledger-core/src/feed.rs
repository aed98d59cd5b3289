//! Activity feed for the home dashboard.
//!
//! The feed is a read-only view over the most-recent-first log: duplicates
//! collapse onto their newest occurrence, the window is truncated, and
//! per-kind counts are taken over what remains.
//!
//! Two events are duplicates when they carry the same external reference,
//! or when they share a kind other than [`ActivityKind::Transfer`] and
//! their `text` or `title` attributes are equal. An absent attribute equals
//! another absent attribute, so untitled check-ins collapse onto the latest.
//!
//! An event is shown only when no newer event in the whole log matches it,
//! including newer events that were themselves hidden. Matching is not
//! transitive, so this differs from comparing against shown entries only.

use crate::event::{ActivityEvent, ActivityKind};
use serde::Serialize;
use std::collections::BTreeMap;

/// Default number of entries shown.
pub const DEFAULT_FEED_LIMIT: usize = 10;

/// Deduplicated, truncated view of the activity log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed<'a> {
    entries: Vec<&'a ActivityEvent>,
}

/// Entry counts by kind over the feed window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedCounts {
    pub all: usize,
    pub by_kind: BTreeMap<ActivityKind, usize>,
}

impl FeedCounts {
    /// Count for one kind (zero when absent).
    #[must_use]
    pub fn of(&self, kind: ActivityKind) -> usize {
        self.by_kind.get(&kind).copied().unwrap_or(0)
    }
}

impl<'a> Feed<'a> {
    /// Build the feed from a most-recent-first log.
    #[must_use]
    pub fn build(events: &'a [ActivityEvent], limit: usize) -> Self {
        let entries = events
            .iter()
            .enumerate()
            .filter(|(idx, event)| {
                !events[..*idx]
                    .iter()
                    .any(|earlier| is_duplicate(earlier, event))
            })
            .map(|(_, event)| event)
            .take(limit)
            .collect();
        Self { entries }
    }

    /// All entries in the window, most recent first.
    #[must_use]
    pub fn entries(&self) -> &[&'a ActivityEvent] {
        &self.entries
    }

    /// Entries of one kind, or all entries for `None`.
    #[must_use]
    pub fn filter(&self, kind: Option<ActivityKind>) -> Vec<&'a ActivityEvent> {
        self.entries
            .iter()
            .copied()
            .filter(|e| kind.is_none_or(|k| e.kind == k))
            .collect()
    }

    /// Per-kind counts; every kind is present, possibly with zero.
    #[must_use]
    pub fn counts(&self) -> FeedCounts {
        let mut by_kind: BTreeMap<ActivityKind, usize> =
            ActivityKind::ALL.iter().map(|k| (*k, 0)).collect();
        for entry in &self.entries {
            *by_kind.entry(entry.kind).or_insert(0) += 1;
        }
        FeedCounts {
            all: self.entries.len(),
            by_kind,
        }
    }

    /// Number of entries in the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the window is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_duplicate(kept: &ActivityEvent, candidate: &ActivityEvent) -> bool {
    if let (Some(a), Some(b)) = (&kept.external_ref, &candidate.external_ref) {
        if a == b {
            return true;
        }
    }
    kept.kind == candidate.kind
        && kept.kind != ActivityKind::Transfer
        && (kept.attribute("text") == candidate.attribute("text")
            || kept.attribute("title") == candidate.attribute("title"))
}
