//! `gm check-in`, `gm greet`, `gm mint`, `gm transfer` — record a confirmed
//! wallet action.
//!
//! The daily check-in and GM gates are enforced here, before anything is
//! recorded. The ledger itself accepts repeats.

use crate::cmd::parse_attr;
use crate::output::{OutputMode, fail, pretty_kv, pretty_section, render_mode};
use crate::session::{Access, CliLedger, Session, SessionOptions};
use clap::Args;
use gmledger_core::error::ErrorCode;
use gmledger_core::{ActivityEvent, ActivityKind, Details};
use serde::Serialize;
use std::io::Write;
use tracing::info;

const CHECK_IN_TITLE: &str = "Daily Streak Maintained";
const GREETING_TEXT: &str = "GM";
const GREETING_AMOUNT: &str = "-0.00 ETH";
const MINT_TITLE: &str = "Minted OG NFT";
const MINT_PRICE: &str = "0.00004";
const TRANSFER_TITLE: &str = "Sent ETH";

#[derive(Args, Debug)]
pub struct CheckInArgs {
    /// Transaction hash of the confirmed check-in.
    #[arg(long)]
    pub tx: Option<String>,

    /// Title shown in the activity feed.
    #[arg(long, default_value = CHECK_IN_TITLE)]
    pub title: String,

    /// Record even if already checked in today.
    #[arg(long)]
    pub force: bool,

    /// Extra attribute stored with the event (repeatable).
    #[arg(long = "attr", value_name = "KEY=VALUE", value_parser = parse_attr)]
    pub attrs: Vec<(String, String)>,
}

#[derive(Args, Debug)]
pub struct GreetArgs {
    /// Greeting message.
    #[arg(long, default_value = GREETING_TEXT)]
    pub text: String,

    /// Transaction hash of the confirmed greeting.
    #[arg(long)]
    pub tx: Option<String>,

    /// Extra attribute stored with the event (repeatable).
    #[arg(long = "attr", value_name = "KEY=VALUE", value_parser = parse_attr)]
    pub attrs: Vec<(String, String)>,
}

#[derive(Args, Debug)]
pub struct MintArgs {
    /// Transaction hash of the confirmed mint.
    #[arg(long)]
    pub tx: Option<String>,

    /// Title shown in the activity feed.
    #[arg(long, default_value = MINT_TITLE)]
    pub title: String,

    /// Price paid, in ETH.
    #[arg(long, default_value = MINT_PRICE)]
    pub amount: String,

    /// Extra attribute stored with the event (repeatable).
    #[arg(long = "attr", value_name = "KEY=VALUE", value_parser = parse_attr)]
    pub attrs: Vec<(String, String)>,
}

#[derive(Args, Debug)]
pub struct TransferArgs {
    /// Amount sent, in ETH.
    #[arg(long)]
    pub amount: String,

    /// Recipient address.
    #[arg(long)]
    pub to: Option<String>,

    /// Transaction hash of the confirmed transfer.
    #[arg(long)]
    pub tx: Option<String>,

    /// Extra attribute stored with the event (repeatable).
    #[arg(long = "attr", value_name = "KEY=VALUE", value_parser = parse_attr)]
    pub attrs: Vec<(String, String)>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Recorded<'a> {
    event: &'a ActivityEvent,
    streak: u32,
    total_points: u64,
    persist_failures: usize,
}

fn details(tx: Option<&str>, attrs: &[(String, String)]) -> Details {
    let mut details = attrs
        .iter()
        .fold(Details::new(), |d, (k, v)| d.with(k.as_str(), v.as_str()));
    if let Some(tx) = tx {
        details = details.with_external_ref(tx);
    }
    details
}

fn eth(amount: &str) -> String {
    let amount = amount.trim().trim_start_matches('-');
    format!("-{amount} ETH")
}

pub fn run_check_in(
    args: &CheckInArgs,
    opts: &SessionOptions,
    output: OutputMode,
) -> anyhow::Result<()> {
    let mut session = Session::open(opts, Access::Write, output)?;
    if session.ledger.has_checked_in_today() && !args.force {
        return Err(fail(output, ErrorCode::AlreadyCheckedIn));
    }
    let details = details(args.tx.as_deref(), &args.attrs).title(args.title.as_str());
    record(&mut session.ledger, ActivityKind::CheckIn, details, output)
}

pub fn run_greet(args: &GreetArgs, opts: &SessionOptions, output: OutputMode) -> anyhow::Result<()> {
    let mut session = Session::open(opts, Access::Write, output)?;
    if session.ledger.has_greeted_today() {
        return Err(fail(output, ErrorCode::AlreadyGreeted));
    }
    let details = details(args.tx.as_deref(), &args.attrs)
        .text(args.text.as_str())
        .amount(GREETING_AMOUNT);
    record(&mut session.ledger, ActivityKind::Greeting, details, output)
}

pub fn run_mint(args: &MintArgs, opts: &SessionOptions, output: OutputMode) -> anyhow::Result<()> {
    let mut session = Session::open(opts, Access::Write, output)?;
    let details = details(args.tx.as_deref(), &args.attrs)
        .title(args.title.as_str())
        .amount(eth(&args.amount));
    record(&mut session.ledger, ActivityKind::Mint, details, output)
}

pub fn run_transfer(
    args: &TransferArgs,
    opts: &SessionOptions,
    output: OutputMode,
) -> anyhow::Result<()> {
    let mut session = Session::open(opts, Access::Write, output)?;
    let mut details = details(args.tx.as_deref(), &args.attrs)
        .title(TRANSFER_TITLE)
        .amount(eth(&args.amount));
    if let Some(to) = &args.to {
        details = details.with("to", to.as_str());
    }
    record(&mut session.ledger, ActivityKind::Transfer, details, output)
}

fn record(
    ledger: &mut CliLedger,
    kind: ActivityKind,
    details: Details,
    output: OutputMode,
) -> anyhow::Result<()> {
    let event = ledger.record(kind, details);
    info!(kind = %event.kind, id = event.id, day = %event.calendar_day, "activity recorded");

    let recorded = Recorded {
        event: &event,
        streak: ledger.check_in().streak,
        total_points: ledger.check_in().total_points,
        persist_failures: ledger.persist_failures(),
    };
    render_mode(output, &recorded, render_text, render_pretty)
}

fn render_text(r: &Recorded<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "{}\t{}\t{}\t+{}\tstreak={}\ttotal={}",
        r.event.kind, r.event.id, r.event.calendar_day, r.event.points, r.streak, r.total_points
    )?;
    if r.persist_failures > 0 {
        writeln!(w, "warning: {} write(s) failed; state may not persist", r.persist_failures)?;
    }
    Ok(())
}

fn render_pretty(r: &Recorded<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Recorded {}", r.event.kind.label()))?;
    if let Some(title) = r.event.title() {
        pretty_kv(w, "Title", title)?;
    }
    if let Some(text) = r.event.text() {
        pretty_kv(w, "Text", text)?;
    }
    if let Some(amount) = r.event.amount() {
        pretty_kv(w, "Amount", amount)?;
    }
    if let Some(tx) = &r.event.external_ref {
        pretty_kv(w, "Tx", tx)?;
    }
    pretty_kv(w, "Day", r.event.calendar_day.to_string())?;
    if r.event.kind.earns_points() {
        pretty_kv(w, "Points", format!("+{}", r.event.points))?;
        pretty_kv(w, "Streak", format!("{} days", r.streak))?;
        pretty_kv(w, "Total points", r.total_points.to_string())?;
    }
    if r.persist_failures > 0 {
        writeln!(
            w,
            "warning: {} write(s) failed; state may not persist",
            r.persist_failures
        )?;
    }
    Ok(())
}
