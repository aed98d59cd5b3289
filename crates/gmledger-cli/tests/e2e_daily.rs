//! End-to-end tests for the daily check-in and GM flows.
//!
//! Each test runs `gm` as a subprocess against a fresh data directory, with
//! `--now` pinning the clock so multi-day streaks are deterministic.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

/// Build a `gm` command isolated to `dir`, with the clock pinned to `now`.
fn gm_cmd(dir: &Path, now: &str) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("gm"));
    cmd.current_dir(dir);
    cmd.env("XDG_CONFIG_HOME", dir.join("config"));
    cmd.env("HOME", dir);
    cmd.env_remove("GM_DATA_DIR");
    cmd.env_remove("FORMAT");
    cmd.env("GM_LOG", "error");
    cmd.arg("--data-dir").arg(dir.join("data"));
    cmd.args(["--now", now]);
    cmd
}

/// Run a command with `--json` and parse stdout.
fn gm_json(dir: &Path, now: &str, args: &[&str]) -> Value {
    let output = gm_cmd(dir, now)
        .args(args)
        .arg("--json")
        .output()
        .expect("gm should not crash");
    assert!(
        output.status.success(),
        "gm {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("--json should produce valid JSON")
}

const MON: &str = "2026-10-19T09:00:00-04:00";
const MON_LATER: &str = "2026-10-19T21:30:00-04:00";
const TUE: &str = "2026-10-20T08:15:00-04:00";
const WED: &str = "2026-10-21T07:00:00-04:00";

// ---------------------------------------------------------------------------
// Check-in
// ---------------------------------------------------------------------------

#[test]
fn first_check_in_starts_streak() {
    let dir = TempDir::new().expect("tempdir");
    let json = gm_json(dir.path(), MON, &["check-in", "--tx", "0xaaa"]);

    assert_eq!(json["event"]["kind"], "check-in");
    assert_eq!(json["event"]["calendarDay"], "2026-10-19");
    assert_eq!(json["event"]["title"], "Daily Streak Maintained");
    assert_eq!(json["event"]["externalRef"], "0xaaa");
    assert_eq!(json["streak"], 1);

    let points = json["event"]["points"].as_u64().expect("points");
    assert!((10..=100).contains(&points), "points out of range: {points}");
    assert_eq!(json["totalPoints"].as_u64(), Some(points));
}

#[test]
fn second_check_in_same_day_is_refused() {
    let dir = TempDir::new().expect("tempdir");
    gm_json(dir.path(), MON, &["check-in"]);

    gm_cmd(dir.path(), MON_LATER)
        .args(["check-in", "--json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2001"));

    let status = gm_json(dir.path(), MON_LATER, &["status"]);
    assert_eq!(status["streak"], 1);
    assert_eq!(status["activityCount"], 1);
}

#[test]
fn forced_repeat_keeps_first_points_and_streak() {
    let dir = TempDir::new().expect("tempdir");
    let first = gm_json(dir.path(), MON, &["check-in"]);
    let repeat = gm_json(dir.path(), MON_LATER, &["check-in", "--force"]);

    assert_eq!(repeat["streak"], 1);
    assert_eq!(repeat["totalPoints"], first["totalPoints"]);
}

#[test]
fn streak_grows_across_days() {
    let dir = TempDir::new().expect("tempdir");
    let mon = gm_json(dir.path(), MON, &["check-in"]);
    let tue = gm_json(dir.path(), TUE, &["check-in"]);
    let wed = gm_json(dir.path(), WED, &["check-in"]);

    assert_eq!(tue["streak"], 2);
    assert_eq!(wed["streak"], 3);
    let sum: u64 = [&mon, &tue, &wed]
        .iter()
        .map(|j| j["event"]["points"].as_u64().expect("points"))
        .sum();
    assert_eq!(wed["totalPoints"].as_u64(), Some(sum));

    let status = gm_json(dir.path(), WED, &["status"]);
    assert_eq!(status["checkedInToday"], true);
    assert_eq!(status["daysToWeeklyGoal"], 4);
    assert_eq!(status["lastCheckInDay"], "2026-10-21");
}

#[test]
fn gate_reopens_after_midnight() {
    let dir = TempDir::new().expect("tempdir");
    gm_json(dir.path(), MON, &["check-in"]);

    let status = gm_json(dir.path(), TUE, &["status"]);
    assert_eq!(status["today"], "2026-10-20");
    assert_eq!(status["checkedInToday"], false);
    assert_eq!(status["streak"], 1);
}

// ---------------------------------------------------------------------------
// GM
// ---------------------------------------------------------------------------

#[test]
fn greeting_is_once_per_day() {
    let dir = TempDir::new().expect("tempdir");
    let json = gm_json(dir.path(), MON, &["greet", "--text", "gm frens"]);
    assert_eq!(json["event"]["kind"], "greeting");
    assert_eq!(json["event"]["text"], "gm frens");
    assert_eq!(json["event"]["points"], 0);
    assert_eq!(json["streak"], 0);

    gm_cmd(dir.path(), MON_LATER)
        .args(["greet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2002"));

    let tue = gm_json(dir.path(), TUE, &["greet"]);
    assert_eq!(tue["event"]["text"], "GM");
}

#[test]
fn greeting_day_is_stored_as_bare_day() {
    let dir = TempDir::new().expect("tempdir");
    gm_json(dir.path(), MON, &["greet"]);
    let stored = fs::read_to_string(dir.path().join("data/dapp_last_greeting_date"))
        .expect("greeting key written");
    assert_eq!(stored, "2026-10-19");

    let status = gm_json(dir.path(), MON_LATER, &["status"]);
    assert_eq!(status["greetedToday"], true);
    assert_eq!(status["checkedInToday"], false);
}

// ---------------------------------------------------------------------------
// Status / week
// ---------------------------------------------------------------------------

#[test]
fn status_on_empty_ledger() {
    let dir = TempDir::new().expect("tempdir");
    let status = gm_json(dir.path(), "2026-10-19T23:59:30-04:00", &["status"]);
    assert_eq!(status["streak"], 0);
    assert_eq!(status["totalPoints"], 0);
    assert_eq!(status["daysToWeeklyGoal"], 7);
    assert_eq!(status["resetsIn"], "00:00:30");
    assert_eq!(status["displayName"], "Alex Sterling");
    assert!(status["lastCheckInDay"].is_null());
}

#[test]
fn week_marks_done_missed_and_today() {
    let dir = TempDir::new().expect("tempdir");
    gm_json(dir.path(), MON, &["check-in"]);
    let week = gm_json(dir.path(), WED, &["week"]);

    assert_eq!(week["slots"][0]["state"], "completed");
    assert_eq!(week["slots"][1]["state"], "missed");
    assert_eq!(week["slots"][2]["state"], "today");
    assert_eq!(week["slots"][2]["checked_in"], false);
    assert_eq!(week["slots"][6]["state"], "upcoming");
    assert_eq!(week["completed"], 1);
}

#[test]
fn text_output_is_line_oriented() {
    let dir = TempDir::new().expect("tempdir");
    gm_json(dir.path(), MON, &["check-in"]);
    gm_cmd(dir.path(), MON)
        .args(["--format", "text", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("streak\t1\n"))
        .stdout(predicate::str::contains("checked_in_today\ttrue\n"));
}

#[test]
fn corrupt_checkin_file_recovers() {
    let dir = TempDir::new().expect("tempdir");
    gm_json(dir.path(), MON, &["check-in"]);
    fs::write(dir.path().join("data/dapp_checkin_data"), "{not json").expect("corrupt");

    let status = gm_json(dir.path(), MON_LATER, &["status"]);
    assert_eq!(status["streak"], 0);
    assert_eq!(status["activityCount"], 1);
    assert_eq!(status["recoveredKeys"][0], "dapp_checkin_data");
    assert_eq!(status["recoveredCode"], "E3001");
}
