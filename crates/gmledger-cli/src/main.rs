#![forbid(unsafe_code)]

mod cmd;
mod output;
mod session;

use chrono::{DateTime, FixedOffset};
use clap::{Parser, Subcommand};
use output::{OutputMode, resolve_output_mode};
use session::SessionOptions;
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "gm: daily check-ins, GM streaks and wallet activity",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output (shorthand for `--format json`).
    #[arg(long, global = true)]
    json: bool,

    /// Output format (pretty, text, json).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Config file (defaults to `<config_dir>/gmledger/config.toml`).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ledger data directory (overrides `GM_DATA_DIR` and the config file).
    #[arg(long, global = true, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Pin the current time (RFC 3339), for replays and tests.
    #[arg(long, global = true, hide = true, value_parser = parse_now)]
    now: Option<DateTime<FixedOffset>>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }

    fn session_options(&self) -> SessionOptions {
        SessionOptions {
            config: self.config.clone(),
            data_dir: self.data_dir.clone(),
            now: self.now,
        }
    }
}

fn parse_now(raw: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(raw).map_err(|e| format!("expected RFC 3339 timestamp: {e}"))
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Record",
        about = "Record today's check-in",
        long_about = "Record a confirmed daily check-in, extending the streak and awarding points.",
        after_help = "EXAMPLES:\n    # Check in after the transaction confirms\n    gm check-in --tx 0xabc...\n\n    # Emit machine-readable output\n    gm check-in --tx 0xabc... --json"
    )]
    CheckIn(cmd::record::CheckInArgs),

    #[command(
        next_help_heading = "Record",
        about = "Say GM for today",
        long_about = "Record a confirmed on-chain GM greeting. One per day.",
        after_help = "EXAMPLES:\n    # Default greeting\n    gm greet --tx 0xabc...\n\n    # Custom message\n    gm greet --text \"gm frens\""
    )]
    Greet(cmd::record::GreetArgs),

    #[command(
        next_help_heading = "Record",
        about = "Record an NFT mint",
        long_about = "Record a confirmed NFT mint.",
        after_help = "EXAMPLES:\n    # Mint at the default price\n    gm mint --tx 0xabc...\n\n    # Custom title and price\n    gm mint --title \"Minted Badge\" --amount 0.001"
    )]
    Mint(cmd::record::MintArgs),

    #[command(
        next_help_heading = "Record",
        about = "Record an outgoing transfer",
        long_about = "Record a confirmed outgoing ETH transfer.",
        after_help = "EXAMPLES:\n    # Send 0.01 ETH\n    gm transfer --amount 0.01 --to 0xdead... --tx 0xabc..."
    )]
    Transfer(cmd::record::TransferArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show streak, points and today's gates",
        after_help = "EXAMPLES:\n    gm status\n\n    # Emit machine-readable output\n    gm status --json"
    )]
    Status(cmd::status::StatusArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show the recent activity feed",
        long_about = "Show recent activity with duplicates collapsed, plus per-kind counts.",
        after_help = "EXAMPLES:\n    gm feed\n\n    # Only mints\n    gm feed --kind mint\n\n    # Last three entries as JSON\n    gm feed --limit 3 --json"
    )]
    Feed(cmd::feed::FeedArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show this week's check-ins",
        after_help = "EXAMPLES:\n    gm week"
    )]
    Week(cmd::week::WeekArgs),

    #[command(
        next_help_heading = "Profile",
        about = "Show or set the display name",
        after_help = "EXAMPLES:\n    gm profile\n\n    gm profile --set \"Sam Rivera\""
    )]
    Profile(cmd::profile::ProfileArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("GM_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "gmledger=debug,gm=debug,info"
        } else {
            "gmledger=info,gm=info,warn"
        })
    });

    let format = env::var("GM_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();
    let opts = cli.session_options();

    match &cli.command {
        Commands::CheckIn(args) => cmd::record::run_check_in(args, &opts, output),
        Commands::Greet(args) => cmd::record::run_greet(args, &opts, output),
        Commands::Mint(args) => cmd::record::run_mint(args, &opts, output),
        Commands::Transfer(args) => cmd::record::run_transfer(args, &opts, output),
        Commands::Status(args) => cmd::status::run_status(args, &opts, output),
        Commands::Feed(args) => cmd::feed::run_feed(args, &opts, output),
        Commands::Week(args) => cmd::week::run_week(args, &opts, output),
        Commands::Profile(args) => cmd::profile::run_profile(args, &opts, output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["gm", "status", "--json", "--data-dir", "/tmp/gm"]);
        assert!(cli.json);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/gm")));
        assert!(matches!(cli.command, Commands::Status(_)));
    }

    #[test]
    fn format_flag_parses_value_enum() {
        let cli = Cli::parse_from(["gm", "--format", "text", "week"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
        assert_eq!(cli.output_mode(), OutputMode::Text);
    }

    #[test]
    fn now_flag_parses_rfc3339() {
        let cli = Cli::parse_from(["gm", "--now", "2026-10-19T08:00:00+02:00", "status"]);
        let opts = cli.session_options();
        assert_eq!(
            opts.now.map(|n| n.to_rfc3339()),
            Some("2026-10-19T08:00:00+02:00".to_string())
        );
        assert!(Cli::try_parse_from(["gm", "--now", "yesterday", "status"]).is_err());
    }

    #[test]
    fn check_in_subcommand_is_kebab_case() {
        let cli = Cli::parse_from(["gm", "check-in", "--tx", "0xabc", "--force"]);
        match cli.command {
            Commands::CheckIn(args) => {
                assert_eq!(args.tx.as_deref(), Some("0xabc"));
                assert!(args.force);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn transfer_requires_amount_at_top_level() {
        assert!(Cli::try_parse_from(["gm", "transfer"]).is_err());
        assert!(Cli::try_parse_from(["gm", "transfer", "--amount", "0.2"]).is_ok());
    }
}
