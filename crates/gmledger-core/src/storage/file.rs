//! Directory-backed store: one file per key.
//!
//! ```text
//! <data_dir>/
//!   dapp_activities
//!   dapp_checkin_data
//!   dapp_last_greeting_date
//!   lock                 # writer lock, see [`FileStore::lock`]
//! ```
//!
//! Writes go to `<key>.tmp` first and are renamed over the key file, so a
//! crash mid-write leaves the previous value intact.

use super::{KeyValueStore, StorageError};
use crate::lock::{LedgerLock, LockError};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

const LOCK_FILE: &str = "lock";

/// Key-value store persisted under a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Root directory of this store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Take the exclusive writer lock for this data directory.
    ///
    /// # Errors
    ///
    /// Returns [`LockError`] on timeout or if the lock file cannot be opened.
    pub fn lock(&self, timeout: Duration) -> Result<LedgerLock, LockError> {
        LedgerLock::acquire(&self.dir.join(LOCK_FILE), timeout)
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if !is_valid_key(key) {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key != LOCK_FILE
        && !key.starts_with('.')
        && !key.ends_with(".tmp")
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp = self.dir.join(format!("{key}.tmp"));

        let write = || -> io::Result<()> {
            let mut file = File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &path)
        };

        write().map_err(|source| {
            let _ = fs::remove_file(&tmp);
            StorageError::Io {
                key: key.to_string(),
                source,
            }
        })
    }
}
