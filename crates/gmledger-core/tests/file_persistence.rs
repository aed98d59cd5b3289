//! File-backed ledger: reload, recovery from damaged keys, and the writer
//! lock used to serialize processes.

use chrono::DateTime;
use gmledger_core::reward::ScriptedReward;
use gmledger_core::{
    ActivityKind, Details, FileStore, FixedClock, KeyValueStore, Ledger, StorageKeys,
};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn clock() -> FixedClock {
    FixedClock::new(DateTime::parse_from_rfc3339("2026-10-19T10:00:00-04:00").expect("valid ts"))
}

fn open(dir: &TempDir, points: &[u32]) -> Ledger<FileStore, FixedClock, ScriptedReward> {
    Ledger::load(
        FileStore::open(dir.path()).expect("open store"),
        clock(),
        ScriptedReward::new(points.iter().copied()),
        StorageKeys::default(),
    )
}

#[test]
fn state_survives_process_restart() {
    let dir = TempDir::new().expect("tempdir");
    {
        let mut ledger = open(&dir, &[64]);
        ledger.record(
            ActivityKind::CheckIn,
            Details::new()
                .title("Daily Streak Maintained")
                .with_external_ref("0xc0ffee"),
        );
        ledger.record(ActivityKind::Greeting, Details::new().text("GM"));
    }

    let ledger = open(&dir, &[]);
    assert!(ledger.has_checked_in_today());
    assert!(ledger.has_greeted_today());
    assert_eq!(ledger.check_in().streak, 1);
    assert_eq!(ledger.check_in().total_points, 64);
    assert_eq!(ledger.activities().len(), 2);
    assert_eq!(ledger.activities()[0].kind, ActivityKind::Greeting);
    assert_eq!(
        ledger.activities()[1].external_ref.as_deref(),
        Some("0xc0ffee")
    );
}

#[test]
fn files_use_documented_keys() {
    let dir = TempDir::new().expect("tempdir");
    let mut ledger = open(&dir, &[11]);
    ledger.record(ActivityKind::CheckIn, Details::new());
    ledger.record(ActivityKind::Greeting, Details::new());

    assert!(dir.path().join("dapp_activities").is_file());
    assert!(dir.path().join("dapp_checkin_data").is_file());
    let greeting =
        fs::read_to_string(dir.path().join("dapp_last_greeting_date")).expect("greeting file");
    assert_eq!(greeting, "2026-10-19");
}

#[test]
fn mint_does_not_touch_checkin_file() {
    let dir = TempDir::new().expect("tempdir");
    let mut ledger = open(&dir, &[]);
    ledger.record(ActivityKind::Mint, Details::new().title("Minted OG NFT"));
    assert!(dir.path().join("dapp_activities").is_file());
    assert!(!dir.path().join("dapp_checkin_data").exists());
    assert!(!dir.path().join("dapp_last_greeting_date").exists());
}

#[test]
fn corrupt_activity_file_resets_only_that_key() {
    let dir = TempDir::new().expect("tempdir");
    {
        let mut ledger = open(&dir, &[33]);
        ledger.record(ActivityKind::CheckIn, Details::new());
    }
    fs::write(dir.path().join("dapp_activities"), "[{\"id\": 1, \"kind\":").expect("corrupt");

    let mut ledger = open(&dir, &[90]);
    assert!(ledger.activities().is_empty());
    assert_eq!(ledger.check_in().total_points, 33);
    assert_eq!(ledger.recovered_keys(), &["dapp_activities".to_string()]);

    ledger.record(ActivityKind::Transfer, Details::new().amount("-0.1 ETH"));
    let reread = FileStore::open(dir.path())
        .expect("reopen")
        .get("dapp_activities")
        .expect("read")
        .expect("present");
    let parsed: serde_json::Value = serde_json::from_str(&reread).expect("valid json again");
    assert_eq!(parsed.as_array().map(Vec::len), Some(1));
}

#[test]
fn non_utf8_activity_file_is_reported_as_recovered() {
    let dir = TempDir::new().expect("tempdir");
    {
        let mut ledger = open(&dir, &[21]);
        ledger.record(ActivityKind::CheckIn, Details::new());
    }
    fs::write(dir.path().join("dapp_activities"), b"[{\"id\":1,\xff\xfe").expect("corrupt");

    let mut ledger = open(&dir, &[]);
    assert!(ledger.activities().is_empty());
    assert_eq!(ledger.check_in().total_points, 21);
    assert_eq!(ledger.recovered_keys(), &["dapp_activities".to_string()]);

    ledger.record(ActivityKind::Mint, Details::new().title("Minted OG NFT"));
    let reread = fs::read_to_string(dir.path().join("dapp_activities")).expect("utf8 again");
    let parsed: serde_json::Value = serde_json::from_str(&reread).expect("valid json again");
    assert_eq!(parsed.as_array().map(Vec::len), Some(1));
}

#[test]
fn lock_serializes_writers() {
    let dir = TempDir::new().expect("tempdir");
    let store = FileStore::open(dir.path()).expect("open store");
    let guard = store.lock(Duration::from_millis(100)).expect("first writer");
    assert!(store.lock(Duration::from_millis(20)).is_err());
    drop(guard);
    assert!(store.lock(Duration::from_millis(20)).is_ok());
}

#[test]
fn custom_prefix_isolates_ledgers() {
    let dir = TempDir::new().expect("tempdir");
    let mut alice = Ledger::load(
        FileStore::open(dir.path()).expect("open"),
        clock(),
        ScriptedReward::new([50]),
        StorageKeys::with_prefix("alice_"),
    );
    alice.record(ActivityKind::CheckIn, Details::new());

    let bob = Ledger::load(
        FileStore::open(dir.path()).expect("open"),
        clock(),
        ScriptedReward::default(),
        StorageKeys::with_prefix("bob_"),
    );
    assert!(!bob.has_checked_in_today());
    assert!(bob.activities().is_empty());
}
