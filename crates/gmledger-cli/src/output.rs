//! Rendering for `gm` results and errors.
//!
//! Commands hand a serializable report plus two writer closures to
//! [`render_mode`]; JSON comes straight from serde. Errors always go to
//! stderr so stdout stays parseable.
//!
//! The mode is picked by `--format`, then `--json`, then the `FORMAT`
//! environment variable, and finally by whether stdout is a terminal.

use clap::ValueEnum;
use gmledger_core::error::ErrorCode;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

/// Width of the dashed rule under section headings.
pub const PRETTY_RULE_WIDTH: usize = 48;

/// Dashed rule.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Heading line plus rule.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// `Key:` padded to a fixed column, then the value.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<16} {}", format!("{key}:"), value.as_ref())
}

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Headed sections for a terminal.
    Pretty,
    /// Tab-separated rows.
    Text,
    /// Pretty-printed JSON.
    Json,
}

fn pick_mode(
    flag: Option<OutputMode>,
    json: bool,
    env: Option<&str>,
    stdout_is_tty: bool,
) -> OutputMode {
    let from_env = env.and_then(|v| OutputMode::from_str(v, true).ok());
    match (flag, json, from_env) {
        (Some(mode), _, _) => mode,
        (None, true, _) => OutputMode::Json,
        (None, false, Some(mode)) => mode,
        // Unknown or unset FORMAT.
        (None, false, None) if stdout_is_tty => OutputMode::Pretty,
        (None, false, None) => OutputMode::Text,
    }
}

/// Output mode for this process.
pub fn resolve_output_mode(flag: Option<OutputMode>, json: bool) -> OutputMode {
    let env = std::env::var("FORMAT").ok();
    pick_mode(flag, json, env.as_deref(), io::stdout().is_terminal())
}

/// Print `value` to stdout in `mode`.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_mode(&mut out, mode, value, text_fn, pretty_fn)
}

/// [`render_mode`] against an arbitrary writer.
pub fn write_mode<T: Serialize>(
    out: &mut dyn Write,
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, out)?,
        OutputMode::Pretty => pretty_fn(value, out)?,
    }
    Ok(())
}

/// Error payload shown to the user.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    /// What to try next.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Catalog code, `E####`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Build from a catalog code, using its message and hint.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::with_code(code, code.message())
    }

    /// A specific message under a catalog code, keeping the code's hint.
    pub fn with_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }
}

/// Print an error to stderr.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    write_error(&mut out, mode, error)
}

fn write_error(out: &mut dyn Write, mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, &serde_json::json!({ "error": error }))?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            match &error.error_code {
                Some(code) => writeln!(out, "error[{code}]: {}", error.message)?,
                None => writeln!(out, "error: {}", error.message)?,
            }
            if let Some(hint) = &error.suggestion {
                writeln!(out, "  hint: {hint}")?;
            }
        }
    }
    Ok(())
}

/// Render a catalog error and return it as an `anyhow` error for exit status.
pub fn fail(mode: OutputMode, code: ErrorCode) -> anyhow::Error {
    if let Err(e) = render_error(mode, &CliError::from_code(code)) {
        return e;
    }
    anyhow::anyhow!("{code}: {}", code.message())
}
