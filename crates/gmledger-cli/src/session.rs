//! Per-invocation ledger wiring: config, data directory, lock, clock.

use crate::output::{CliError, OutputMode, render_error};
use chrono::{DateTime, FixedOffset};
use gmledger_core::config::{LedgerConfig, RealEnv, load_config, resolve_data_dir};
use gmledger_core::error::ErrorCode;
use gmledger_core::lock::LedgerLock;
use gmledger_core::reward::RngReward;
use gmledger_core::{Clock, FileStore, FixedClock, Ledger, SystemClock};
use rand::rngs::ThreadRng;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Ledger type used by every command.
pub type CliLedger = Ledger<FileStore, Box<dyn Clock>, RngReward<ThreadRng>>;

/// Inputs shared by all commands, taken from global flags.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub now: Option<DateTime<FixedOffset>>,
}

/// Whether a command writes to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// A loaded ledger plus the lock guarding it.
pub struct Session {
    pub config: LedgerConfig,
    pub data_dir: PathBuf,
    pub ledger: CliLedger,
    _lock: Option<LedgerLock>,
}

impl Session {
    /// Resolve config and storage, take the writer lock when needed, and
    /// load the ledger.
    ///
    /// Errors are rendered in `output` before being returned.
    pub fn open(opts: &SessionOptions, access: Access, output: OutputMode) -> anyhow::Result<Self> {
        let config = match load_config(opts.config.as_deref()) {
            Ok(config) => config,
            Err(e) => return Err(report(output, ErrorCode::ConfigParseError, &format!("{e:#}"))),
        };

        let data_dir = resolve_data_dir(opts.data_dir.as_deref(), &config.storage, &RealEnv)
            .map_err(|e| report(output, ErrorCode::DataDirUnavailable, &format!("{e:#}")))?;
        let store = FileStore::open(&data_dir)
            .map_err(|e| report(output, e.code(), &e.to_string()))?;

        let lock = match access {
            Access::Read => None,
            Access::Write => Some(
                store
                    .lock(config.storage.lock_timeout())
                    .map_err(|e| report(output, e.code(), &e.to_string()))?,
            ),
        };

        let clock: Box<dyn Clock> = match opts.now {
            Some(now) => Box::new(FixedClock::new(now)),
            None => Box::new(SystemClock),
        };
        let ledger = Ledger::load(store, clock, RngReward::thread(), config.storage.keys());
        for key in ledger.recovered_keys() {
            warn!(
                code = %ErrorCode::MalformedPersistedState,
                key = %key,
                "stored value was unreadable and has been reset"
            );
        }
        debug!(data_dir = %data_dir.display(), ?access, "ledger session opened");

        Ok(Self {
            config,
            data_dir,
            ledger,
            _lock: lock,
        })
    }
}

fn report(output: OutputMode, code: ErrorCode, detail: &str) -> anyhow::Error {
    if let Err(e) = render_error(output, &CliError::with_code(code, detail)) {
        return e;
    }
    anyhow::anyhow!("{detail}")
}
