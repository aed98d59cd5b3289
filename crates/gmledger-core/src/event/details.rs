//! Free-form display attributes attached to an event at record time.
//!
//! The ledger never interprets these beyond dropping keys that would shadow
//! the event's own fields once flattened into the serialized record.

use serde_json::Value;
use std::collections::BTreeMap;

/// Field names owned by [`ActivityEvent`](super::ActivityEvent) itself.
pub const RESERVED_KEYS: [&str; 7] = [
    "id",
    "kind",
    "occurredAt",
    "calendarDay",
    "points",
    "status",
    "externalRef",
];

/// Attribute bag passed to [`Ledger::record`](crate::ledger::Ledger::record).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Details {
    external_ref: Option<String>,
    attributes: BTreeMap<String, Value>,
}

impl Details {
    /// Empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an opaque external reference, e.g. a transaction hash.
    #[must_use]
    pub fn with_external_ref(mut self, reference: impl Into<String>) -> Self {
        self.external_ref = Some(reference.into());
        self
    }

    /// Attach one display attribute.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Shorthand for the `title` attribute.
    #[must_use]
    pub fn title(self, title: impl Into<String>) -> Self {
        self.with("title", title.into())
    }

    /// Shorthand for the `text` attribute.
    #[must_use]
    pub fn text(self, text: impl Into<String>) -> Self {
        self.with("text", text.into())
    }

    /// Shorthand for the `amount` attribute.
    #[must_use]
    pub fn amount(self, amount: impl Into<String>) -> Self {
        self.with("amount", amount.into())
    }

    /// The external reference, if any.
    #[must_use]
    pub fn external_ref(&self) -> Option<&str> {
        self.external_ref.as_deref()
    }

    /// Split into the external reference and the attributes that are safe to
    /// flatten, plus the names of any reserved keys that were discarded.
    #[must_use]
    pub fn into_parts(self) -> (Option<String>, BTreeMap<String, Value>, Vec<String>) {
        let mut attributes = self.attributes;
        let dropped: Vec<String> = RESERVED_KEYS
            .iter()
            .filter_map(|k| attributes.remove_entry(*k).map(|(k, _)| k))
            .collect();
        (self.external_ref, attributes, dropped)
    }
}
