//! `gm status` — streak, points and today's gates.

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use crate::session::{Access, Session, SessionOptions};
use clap::Args;
use gmledger_core::error::ErrorCode;
use gmledger_core::{Clock, LedgerStatus};
use gmledger_core::profile::Profile;
use gmledger_core::week::{format_countdown, time_until_reset};
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug, Default)]
pub struct StatusArgs {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusOutput {
    display_name: String,
    #[serde(flatten)]
    status: LedgerStatus,
    resets_in: String,
    data_dir: String,
    recovered_keys: Vec<String>,
    /// `E3001` when any key was reset at load.
    #[serde(skip_serializing_if = "Option::is_none")]
    recovered_code: Option<&'static str>,
}

pub fn run_status(
    _args: &StatusArgs,
    opts: &SessionOptions,
    output: OutputMode,
) -> anyhow::Result<()> {
    let session = Session::open(opts, Access::Read, output)?;
    let ledger = &session.ledger;
    let profile = Profile::new(
        &ledger.keys().user_name,
        session.config.profile.default_name.as_str(),
    );

    let report = StatusOutput {
        display_name: profile.display_name(ledger.store()),
        status: ledger.status(),
        resets_in: format_countdown(time_until_reset(&ledger.clock().now())),
        data_dir: session.data_dir.display().to_string(),
        recovered_keys: ledger.recovered_keys().to_vec(),
        recovered_code: (!ledger.recovered_keys().is_empty())
            .then_some(ErrorCode::MalformedPersistedState.code()),
    };
    render_mode(output, &report, render_text, render_pretty)
}

const fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn render_text(r: &StatusOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let s = &r.status;
    writeln!(w, "today\t{}", s.today)?;
    writeln!(w, "streak\t{}", s.streak)?;
    writeln!(w, "total_points\t{}", s.total_points)?;
    writeln!(w, "checked_in_today\t{}", s.checked_in_today)?;
    writeln!(w, "greeted_today\t{}", s.greeted_today)?;
    writeln!(w, "weekly_progress\t{:.0}%", s.weekly_progress * 100.0)?;
    writeln!(w, "days_to_weekly_goal\t{}", s.days_to_weekly_goal)?;
    writeln!(w, "resets_in\t{}", r.resets_in)?;
    for key in &r.recovered_keys {
        writeln!(
            w,
            "recovered\t{key}\t{}",
            ErrorCode::MalformedPersistedState
        )?;
    }
    Ok(())
}

fn render_pretty(r: &StatusOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let s = &r.status;
    pretty_section(w, &format!("GM, {}", r.display_name))?;
    pretty_kv(w, "Today", s.today.to_string())?;
    pretty_kv(w, "Streak", format!("{} days", s.streak))?;
    pretty_kv(w, "Total points", s.total_points.to_string())?;
    pretty_kv(
        w,
        "Weekly goal",
        format!(
            "{:.0}% ({} to go)",
            s.weekly_progress * 100.0,
            s.days_to_weekly_goal
        ),
    )?;
    pretty_kv(w, "Checked in", yes_no(s.checked_in_today))?;
    pretty_kv(w, "Said GM", yes_no(s.greeted_today))?;
    pretty_kv(w, "Resets in", &r.resets_in)?;
    pretty_kv(w, "Activities", s.activity_count.to_string())?;
    pretty_kv(w, "Data", &r.data_dir)?;
    let code = ErrorCode::MalformedPersistedState;
    for key in &r.recovered_keys {
        writeln!(w, "warning[{code}]: {key} was unreadable and has been reset")?;
    }
    if let Some(hint) = code.hint().filter(|_| !r.recovered_keys.is_empty()) {
        writeln!(w, "  hint: {hint}")?;
    }
    Ok(())
}
