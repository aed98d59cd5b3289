//! Durable key-value storage consumed by the ledger.
//!
//! The ledger persists three documents, each under its own key:
//!
//! ```text
//! {prefix}activities          JSON array of events, most recent first
//! {prefix}checkin_data        JSON check-in aggregate
//! {prefix}last_greeting_date  bare YYYY-MM-DD string
//! ```
//!
//! and the profile module adds `{prefix}user_name`.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::ErrorCode;
use std::io;

/// Default prefix applied to every storage key.
pub const DEFAULT_KEY_PREFIX: &str = "dapp_";

/// Errors surfaced by a [`KeyValueStore`].
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error reading or writing a key.
    #[error("storage I/O error on '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    /// The key is not a valid storage name.
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
}

impl StorageError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } | Self::InvalidKey(_) => ErrorCode::StorageWriteFailed,
        }
    }
}

/// Minimal string key-value store, in the shape of browser local storage.
pub trait KeyValueStore {
    /// Read a key, `Ok(None)` if it was never written.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a key, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing medium cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &mut T {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// The concrete key names for one prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub activities: String,
    pub check_in: String,
    pub last_greeting: String,
    pub user_name: String,
}

impl StorageKeys {
    /// Build the key set for `prefix`.
    #[must_use]
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            activities: format!("{prefix}activities"),
            check_in: format!("{prefix}checkin_data"),
            last_greeting: format!("{prefix}last_greeting_date"),
            user_name: format!("{prefix}user_name"),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_KEY_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_keys_use_dapp_prefix() {
        let keys = StorageKeys::default();
        assert_eq!(keys.activities, "dapp_activities");
        assert_eq!(keys.check_in, "dapp_checkin_data");
        assert_eq!(keys.last_greeting, "dapp_last_greeting_date");
        assert_eq!(keys.user_name, "dapp_user_name");
    }

    #[test]
    fn custom_prefix_applies_to_every_key() {
        let keys = StorageKeys::with_prefix("alice.");
        assert!(keys.activities.starts_with("alice."));
        assert!(keys.check_in.starts_with("alice."));
        assert!(keys.last_greeting.starts_with("alice."));
        assert!(keys.user_name.starts_with("alice."));
    }

    fn write_through<S: KeyValueStore>(mut store: S) {
        store.set("k", "v").expect("set");
        assert_eq!(store.get("k").expect("get").as_deref(), Some("v"));
    }

    #[test]
    fn mut_ref_forwards() {
        let mut store = MemoryStore::new();
        write_through(&mut store);
        assert_eq!(store.get("k").expect("get").as_deref(), Some("v"));
    }
}
