//! `gm week` — Monday-first check-in strip for the current week.

use crate::output::{OutputMode, pretty_section, render_mode};
use crate::session::{Access, Session, SessionOptions};
use clap::Args;
use gmledger_core::Clock;
use gmledger_core::week::{SlotState, WeekView, format_countdown, time_until_reset};
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug, Default)]
pub struct WeekArgs {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WeekOutput {
    #[serde(flatten)]
    view: WeekView,
    completed: usize,
    streak: u32,
    resets_in: String,
}

pub fn run_week(_args: &WeekArgs, opts: &SessionOptions, output: OutputMode) -> anyhow::Result<()> {
    let session = Session::open(opts, Access::Read, output)?;
    let ledger = &session.ledger;
    let view = WeekView::for_day(ledger.today(), ledger.check_in());
    let report = WeekOutput {
        completed: view.completed(),
        view,
        streak: ledger.check_in().streak,
        resets_in: format_countdown(time_until_reset(&ledger.clock().now())),
    };
    render_mode(output, &report, render_text, render_pretty)
}

const fn marker(state: SlotState) -> &'static str {
    match state {
        SlotState::Completed | SlotState::Today { checked_in: true } => "done",
        SlotState::Missed => "missed",
        SlotState::Today { checked_in: false } => "today",
        SlotState::Upcoming => "upcoming",
    }
}

fn render_text(r: &WeekOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for slot in &r.view.slots {
        writeln!(w, "{}\t{}\t{}", slot.day, slot.weekday, marker(slot.state))?;
    }
    Ok(())
}

fn render_pretty(r: &WeekOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(
        w,
        &format!("This week: {}/7 · streak {} days", r.completed, r.streak),
    )?;
    let labels: Vec<String> = r.view.slots.iter().map(|s| format!("{:^5}", s.weekday)).collect();
    writeln!(w, "{}", labels.join(""))?;
    let glyphs: Vec<String> = r
        .view
        .slots
        .iter()
        .map(|s| {
            let glyph = match s.state {
                SlotState::Completed | SlotState::Today { checked_in: true } => "[x]",
                SlotState::Missed => " - ",
                SlotState::Today { checked_in: false } => "[ ]",
                SlotState::Upcoming => " . ",
            };
            format!("{glyph:^5}")
        })
        .collect();
    writeln!(w, "{}", glyphs.join(""))?;
    writeln!(w, "Next reset in {}", r.resets_in)
}
