//! Cross-process writer lock for a ledger data directory.
//!
//! Every mutating `gm` invocation holds this lock from the moment it loads
//! state until its last write lands, so two recorders never interleave.

use crate::error::ErrorCode;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

const FIRST_RETRY: Duration = Duration::from_millis(5);
const MAX_RETRY: Duration = Duration::from_millis(50);

/// Why the ledger lock could not be taken.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    /// Another process kept the lock for the whole wait.
    #[error("ledger at {} is locked by another process (waited {waited:?})", path.display())]
    Timeout { path: PathBuf, waited: Duration },

    /// The lock file could not be created or opened.
    #[error("cannot open lock file: {0}")]
    IoError(#[from] io::Error),
}

impl LockError {
    /// Machine-readable code associated with this lock error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Timeout { .. } => ErrorCode::LockContention,
            Self::IoError(_) => ErrorCode::StorageWriteFailed,
        }
    }

    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

/// Exclusive advisory lock, released on drop.
#[derive(Debug)]
pub struct LedgerLock {
    file: File,
    path: PathBuf,
}

impl LedgerLock {
    /// Take the lock at `path`, retrying with backoff for up to `timeout`.
    ///
    /// The lock file and its parent directory are created when missing.
    ///
    /// # Errors
    ///
    /// [`LockError::Timeout`] when the lock stays held past `timeout`;
    /// [`LockError::IoError`] when the lock file cannot be opened.
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self, LockError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;

        let started = Instant::now();
        let mut pause = FIRST_RETRY;
        while file.try_lock_exclusive().is_err() {
            let waited = started.elapsed();
            if waited >= timeout {
                return Err(LockError::Timeout {
                    path: path.to_path_buf(),
                    waited,
                });
            }
            thread::sleep(pause.min(timeout.saturating_sub(waited)));
            pause = (pause * 2).min(MAX_RETRY);
        }

        debug!(path = %path.display(), waited = ?started.elapsed(), "ledger lock held");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Give the lock back before the guard goes out of scope.
    pub fn release(self) {
        drop(self);
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LedgerLock {
    fn drop(&mut self) {
        if let Err(error) = FileExt::unlock(&self.file) {
            debug!(path = %self.path.display(), %error, "unlock failed; closing file releases it");
        }
    }
}
