//! gmledger-core library.
//!
//! Records confirmed wallet actions (check-ins, GM greetings, mints,
//! transfers) in an append-only log and derives streaks, points and the
//! "already done today" gates from it.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums at module seams, `anyhow::Result` for
//!   config loading. Ledger operations themselves are total.
//! - **Logging**: `tracing` macros (`debug!` for state changes, `warn!` for
//!   swallowed storage failures and recovered state).

pub mod checkin;
pub mod config;
pub mod day;
pub mod error;
pub mod event;
pub mod feed;
pub mod ledger;
pub mod lock;
pub mod profile;
pub mod reward;
pub mod storage;
pub mod week;

pub use checkin::CheckInAggregate;
pub use day::{CalendarDay, Clock, FixedClock, SystemClock};
pub use event::{ActivityEvent, ActivityKind, Details};
pub use ledger::{Ledger, LedgerStatus, SystemLedger};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageKeys};
