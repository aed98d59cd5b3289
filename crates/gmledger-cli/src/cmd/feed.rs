//! `gm feed` — the deduplicated recent-activity list.

use crate::output::{OutputMode, fail, pretty_rule, pretty_section, render_mode};
use crate::session::{Access, Session, SessionOptions};
use clap::Args;
use gmledger_core::error::ErrorCode;
use gmledger_core::feed::{Feed, FeedCounts};
use gmledger_core::{ActivityEvent, ActivityKind};
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug, Default)]
pub struct FeedArgs {
    /// Only show one kind (check-in, greeting, mint, transfer).
    #[arg(long)]
    pub kind: Option<String>,

    /// Maximum entries before filtering (defaults to `feed.limit`).
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct FeedOutput<'a> {
    counts: FeedCounts,
    entries: Vec<&'a ActivityEvent>,
}

pub fn run_feed(args: &FeedArgs, opts: &SessionOptions, output: OutputMode) -> anyhow::Result<()> {
    let kind = match args.kind.as_deref().map(str::parse::<ActivityKind>) {
        None => None,
        Some(Ok(kind)) => Some(kind),
        Some(Err(_)) => return Err(fail(output, ErrorCode::InvalidActivityKind)),
    };

    let session = Session::open(opts, Access::Read, output)?;
    let limit = args.limit.unwrap_or(session.config.feed.limit);
    let feed = Feed::build(session.ledger.activities(), limit);
    let report = FeedOutput {
        counts: feed.counts(),
        entries: feed.filter(kind),
    };
    render_mode(output, &report, render_text, render_pretty)
}

fn summary(event: &ActivityEvent) -> String {
    event
        .title()
        .or_else(|| event.text())
        .unwrap_or(event.kind.label())
        .to_string()
}

fn render_text(r: &FeedOutput<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    for e in &r.entries {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}",
            e.id,
            e.kind,
            e.occurred_at.to_rfc3339(),
            summary(e),
            e.amount().unwrap_or("-"),
            e.points
        )?;
    }
    Ok(())
}

fn render_pretty(r: &FeedOutput<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    let tabs = ActivityKind::ALL
        .iter()
        .map(|k| format!("{} {}", k.label(), r.counts.of(*k)))
        .collect::<Vec<_>>()
        .join(" · ");
    pretty_section(w, &format!("Activity ({} total) · {tabs}", r.counts.all))?;
    if r.entries.is_empty() {
        writeln!(w, "No activity yet.")?;
        return Ok(());
    }
    for e in &r.entries {
        let when = e.occurred_at.format("%Y-%m-%d %H:%M");
        let amount = e.amount().unwrap_or("");
        writeln!(w, "{:<10} {:<28} {:>14}  {when}", e.kind.label(), summary(e), amount)?;
        if e.points > 0 {
            writeln!(w, "{:<10} +{} points", "", e.points)?;
        }
    }
    pretty_rule(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use clap::Parser;
    use gmledger_core::event::ActivityStatus;
    use std::collections::BTreeMap;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: FeedArgs,
    }

    fn event(id: u64, kind: ActivityKind, title: Option<&str>) -> ActivityEvent {
        let occurred_at = DateTime::parse_from_rfc3339("2026-10-19T09:15:00+00:00").expect("ts");
        let mut details = BTreeMap::new();
        if let Some(title) = title {
            details.insert("title".to_string(), serde_json::json!(title));
        }
        ActivityEvent {
            id,
            kind,
            occurred_at,
            calendar_day: gmledger_core::CalendarDay::of(&occurred_at),
            points: 0,
            status: ActivityStatus::Confirmed,
            external_ref: None,
            details,
        }
    }

    #[test]
    fn feed_args_parse() {
        let w = Wrapper::parse_from(["test", "--kind", "gm", "--limit", "5"]);
        assert_eq!(w.args.kind.as_deref(), Some("gm"));
        assert_eq!(w.args.limit, Some(5));
    }

    #[test]
    fn summary_falls_back_to_label() {
        assert_eq!(summary(&event(1, ActivityKind::Mint, Some("Minted OG NFT"))), "Minted OG NFT");
        assert_eq!(summary(&event(2, ActivityKind::Greeting, None)), "GM");
    }

    #[test]
    fn pretty_shows_counts_and_empty_state() {
        let events: Vec<ActivityEvent> = Vec::new();
        let feed = Feed::build(&events, 10);
        let report = FeedOutput {
            counts: feed.counts(),
            entries: feed.filter(None),
        };
        let mut buf = Vec::new();
        render_pretty(&report, &mut buf).expect("render");
        let s = String::from_utf8(buf).expect("utf8");
        assert!(s.starts_with("Activity (0 total) · Check-in 0"));
        assert!(s.contains("No activity yet."));
    }

    #[test]
    fn text_has_one_row_per_entry() {
        let events = vec![
            event(2, ActivityKind::Mint, Some("Minted OG NFT")),
            event(1, ActivityKind::Transfer, Some("Sent ETH")),
        ];
        let feed = Feed::build(&events, 10);
        let report = FeedOutput {
            counts: feed.counts(),
            entries: feed.filter(None),
        };
        let mut buf = Vec::new();
        render_text(&report, &mut buf).expect("render");
        let s = String::from_utf8(buf).expect("utf8");
        assert_eq!(s.lines().count(), 2);
        assert!(s.lines().next().is_some_and(|l| l.starts_with("2\tmint\t")));
    }
}
