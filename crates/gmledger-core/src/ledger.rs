//! The activity ledger: append-only event log plus derived analytics.
//!
//! A [`Ledger`] owns the event list, the [`CheckInAggregate`] and the last
//! greeting day. It is the only writer of those values; [`Ledger::record`]
//! is the only mutation. After every mutation the affected keys are written
//! back to the injected [`KeyValueStore`].
//!
//! Persistence is best-effort: a failed write is logged and counted, and the
//! in-memory state stays authoritative for the rest of the session. On load,
//! a key that fails to parse is logged and replaced by its empty value;
//! other keys load independently.

use crate::checkin::CheckInAggregate;
use crate::day::{CalendarDay, Clock, SystemClock};
use crate::error::ErrorCode;
use crate::event::{ActivityEvent, ActivityKind, ActivityStatus, Details};
use crate::reward::{CHECK_IN_POINTS, RewardSource, RngReward};
use crate::storage::{KeyValueStore, StorageKeys};
use rand::rngs::ThreadRng;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Ledger wired to the host clock and thread-local RNG.
pub type SystemLedger<S> = Ledger<S, SystemClock, RngReward<ThreadRng>>;

/// Append-only activity log with streak and daily-gate analytics.
#[derive(Debug)]
pub struct Ledger<S, C, R> {
    store: S,
    clock: C,
    reward: R,
    keys: StorageKeys,
    activities: Vec<ActivityEvent>,
    check_in: CheckInAggregate,
    last_greeting_day: Option<CalendarDay>,
    recovered_keys: Vec<String>,
    persist_failures: usize,
}

/// Point-in-time summary of the ledger's queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerStatus {
    pub today: CalendarDay,
    pub streak: u32,
    pub total_points: u64,
    pub checked_in_today: bool,
    pub greeted_today: bool,
    pub weekly_progress: f64,
    pub days_to_weekly_goal: u32,
    pub last_check_in_day: Option<CalendarDay>,
    pub last_greeting_day: Option<CalendarDay>,
    pub activity_count: usize,
}

impl<S: KeyValueStore> SystemLedger<S> {
    /// Load a ledger over `store` using the host clock and RNG.
    #[must_use]
    pub fn open(store: S, keys: StorageKeys) -> Self {
        Ledger::load(store, SystemClock, RngReward::thread(), keys)
    }
}

impl<S, C, R> Ledger<S, C, R>
where
    S: KeyValueStore,
    C: Clock,
    R: RewardSource,
{
    /// Load persisted state from `store`, falling back to empty values for
    /// anything missing or malformed.
    ///
    /// A key that exists but cannot be read or parsed is listed in
    /// [`Ledger::recovered_keys`].
    #[must_use]
    pub fn load(store: S, clock: C, reward: R, keys: StorageKeys) -> Self {
        let mut recovered_keys = Vec::new();

        let activities: Vec<ActivityEvent> =
            load_json(&store, &keys.activities, &mut recovered_keys).unwrap_or_default();
        let check_in = load_json::<CheckInAggregate>(&store, &keys.check_in, &mut recovered_keys)
            .map(CheckInAggregate::normalized)
            .unwrap_or_default();
        let last_greeting_day = load_day(&store, &keys.last_greeting, &mut recovered_keys);

        debug!(
            activities = activities.len(),
            streak = check_in.streak,
            total_points = check_in.total_points,
            recovered = recovered_keys.len(),
            "ledger loaded"
        );

        Self {
            store,
            clock,
            reward,
            keys,
            activities,
            check_in,
            last_greeting_day,
            recovered_keys,
            persist_failures: 0,
        }
    }

    /// Record one confirmed action and return the created event.
    ///
    /// Check-ins draw their points from [`CHECK_IN_POINTS`]; every other kind
    /// earns zero. The event is placed at the head of the log, the affected
    /// aggregate is replaced, and the changed keys are persisted.
    pub fn record(&mut self, kind: ActivityKind, details: Details) -> ActivityEvent {
        let occurred_at = self.clock.now();
        let calendar_day = CalendarDay::of(&occurred_at);
        let points = if kind.earns_points() {
            self.reward.draw(CHECK_IN_POINTS)
        } else {
            0
        };

        let (external_ref, attributes, dropped) = details.into_parts();
        if !dropped.is_empty() {
            debug!(?dropped, "ignoring reserved detail keys");
        }

        let event = ActivityEvent {
            id: self.next_id(occurred_at.timestamp_millis()),
            kind,
            occurred_at,
            calendar_day,
            points,
            status: ActivityStatus::Confirmed,
            external_ref,
            details: attributes,
        };

        self.activities.insert(0, event.clone());

        match kind {
            ActivityKind::Greeting => self.last_greeting_day = Some(calendar_day),
            ActivityKind::CheckIn => {
                self.check_in = self.check_in.with_check_in(calendar_day, points);
            }
            ActivityKind::Mint | ActivityKind::Transfer => {}
        }

        debug!(
            id = event.id,
            %kind,
            day = %calendar_day,
            points,
            streak = self.check_in.streak,
            "recorded activity"
        );

        self.persist(kind);
        event
    }

    /// Whether the latest check-in falls on the clock's current day.
    #[must_use]
    pub fn has_checked_in_today(&self) -> bool {
        self.check_in.checked_in_on(self.clock.today())
    }

    /// Whether the latest greeting falls on the clock's current day.
    #[must_use]
    pub fn has_greeted_today(&self) -> bool {
        self.last_greeting_day == Some(self.clock.today())
    }

    /// `(streak mod 7) / 7`, for progress display.
    #[must_use]
    pub fn weekly_progress(&self) -> f64 {
        self.check_in.weekly_progress()
    }

    /// The event log, most recent first.
    #[must_use]
    pub fn activities(&self) -> &[ActivityEvent] {
        &self.activities
    }

    /// Current check-in aggregate.
    #[must_use]
    pub const fn check_in(&self) -> &CheckInAggregate {
        &self.check_in
    }

    /// Day of the most recent greeting.
    #[must_use]
    pub const fn last_greeting_day(&self) -> Option<CalendarDay> {
        self.last_greeting_day
    }

    /// The clock's current day.
    #[must_use]
    pub fn today(&self) -> CalendarDay {
        self.clock.today()
    }

    /// Summary of every query, evaluated against the current day.
    #[must_use]
    pub fn status(&self) -> LedgerStatus {
        LedgerStatus {
            today: self.today(),
            streak: self.check_in.streak,
            total_points: self.check_in.total_points,
            checked_in_today: self.has_checked_in_today(),
            greeted_today: self.has_greeted_today(),
            weekly_progress: self.weekly_progress(),
            days_to_weekly_goal: self.check_in.days_to_weekly_goal(),
            last_check_in_day: self.check_in.last_check_in_day,
            last_greeting_day: self.last_greeting_day,
            activity_count: self.activities.len(),
        }
    }

    /// Keys that were present but unreadable or malformed at load, and were
    /// reset to empty.
    #[must_use]
    pub fn recovered_keys(&self) -> &[String] {
        &self.recovered_keys
    }

    /// Number of persistence writes that failed this session.
    #[must_use]
    pub const fn persist_failures(&self) -> usize {
        self.persist_failures
    }

    /// Storage keys in use.
    #[must_use]
    pub const fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// The injected clock.
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// The backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the backing store.
    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Tear down the ledger and hand back its store.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    fn next_id(&self, now_millis: i64) -> u64 {
        let now = u64::try_from(now_millis).unwrap_or(0);
        self.activities
            .first()
            .map_or(now, |newest| now.max(newest.id.saturating_add(1)))
    }

    fn persist(&mut self, kind: ActivityKind) {
        let activities = serde_json::to_string(&self.activities);
        self.write_key(self.keys.activities.clone(), activities);

        match kind {
            ActivityKind::CheckIn => {
                let check_in = serde_json::to_string(&self.check_in);
                self.write_key(self.keys.check_in.clone(), check_in);
            }
            ActivityKind::Greeting => {
                if let Some(day) = self.last_greeting_day {
                    self.write_key(self.keys.last_greeting.clone(), Ok(day.to_string()));
                }
            }
            ActivityKind::Mint | ActivityKind::Transfer => {}
        }
    }

    fn write_key(&mut self, key: String, value: Result<String, serde_json::Error>) {
        let result = match value {
            Ok(value) => self.store.set(&key, &value).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        if let Err(error) = result {
            self.persist_failures += 1;
            warn!(%key, %error, "ledger write failed; keeping in-memory state");
        }
    }
}

fn load_json<T: DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
    recovered: &mut Vec<String>,
) -> Option<T> {
    let raw = read_key(store, key, recovered)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(error) => {
            reset_key(key, &error, recovered);
            None
        }
    }
}

fn load_day(
    store: &impl KeyValueStore,
    key: &str,
    recovered: &mut Vec<String>,
) -> Option<CalendarDay> {
    let raw = read_key(store, key, recovered)?;
    let trimmed = raw.trim().trim_matches('"');
    if trimmed.is_empty() || trimmed == "null" {
        return None;
    }
    match trimmed.parse() {
        Ok(day) => Some(day),
        Err(error) => {
            reset_key(key, &error, recovered);
            None
        }
    }
}

fn read_key(
    store: &impl KeyValueStore,
    key: &str,
    recovered: &mut Vec<String>,
) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(error) => {
            reset_key(key, &error, recovered);
            None
        }
    }
}

fn reset_key(key: &str, error: &dyn std::error::Error, recovered: &mut Vec<String>) {
    warn!(
        code = %ErrorCode::MalformedPersistedState,
        %key,
        %error,
        "persisted state unreadable; starting empty"
    );
    recovered.push(key.to_string());
}
