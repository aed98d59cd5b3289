//! Display-name profile stored next to the ledger.

use crate::error::ErrorCode;
use crate::storage::{KeyValueStore, StorageError};

/// Name shown before the user has chosen one.
pub const DEFAULT_DISPLAY_NAME: &str = "Alex Sterling";

/// Errors from profile updates.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// The proposed name is empty after trimming.
    #[error("display name must not be empty")]
    EmptyName,

    /// The name could not be saved.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ProfileError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyName => ErrorCode::InvalidProfileName,
            Self::Storage(err) => err.code(),
        }
    }
}

/// Reads and writes the display name under a single storage key.
#[derive(Debug, Clone)]
pub struct Profile<'k> {
    key: &'k str,
    default_name: String,
}

impl<'k> Profile<'k> {
    /// Profile stored at `key`, falling back to `default_name`.
    #[must_use]
    pub fn new(key: &'k str, default_name: impl Into<String>) -> Self {
        Self {
            key,
            default_name: default_name.into(),
        }
    }

    /// The stored name, or the default when unset or unreadable.
    #[must_use]
    pub fn display_name(&self, store: &impl KeyValueStore) -> String {
        match store.get(self.key) {
            Ok(Some(name)) if !name.trim().is_empty() => name,
            Ok(_) => self.default_name.clone(),
            Err(error) => {
                tracing::warn!(key = self.key, %error, "profile read failed; using default");
                self.default_name.clone()
            }
        }
    }

    /// Persist a user-chosen name and return it trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::EmptyName`] for blank input, or the storage
    /// error if the write fails.
    pub fn set_display_name(
        &self,
        store: &mut impl KeyValueStore,
        name: &str,
    ) -> Result<String, ProfileError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProfileError::EmptyName);
        }
        store.set(self.key, name)?;
        Ok(name.to_string())
    }

    /// Adopt a name supplied by the host context (e.g. the social client's
    /// user record). Blank or missing host names leave the stored one alone.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the write fails.
    pub fn sync_from_host(
        &self,
        store: &mut impl KeyValueStore,
        host_name: Option<&str>,
    ) -> Result<String, ProfileError> {
        match host_name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => self.set_display_name(store, name),
            None => Ok(self.display_name(store)),
        }
    }
}
