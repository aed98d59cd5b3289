//! `gm profile` — show or change the display name.

use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};
use crate::session::{Access, Session, SessionOptions};
use clap::Args;
use gmledger_core::profile::Profile;
use serde::Serialize;
use tracing::info;

#[derive(Args, Debug, Default)]
pub struct ProfileArgs {
    /// New display name.
    #[arg(long, conflicts_with = "from_host")]
    pub set: Option<String>,

    /// Adopt the name reported by the host client, if non-blank.
    #[arg(long, value_name = "NAME")]
    pub from_host: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileOutput {
    display_name: String,
    updated: bool,
}

pub fn run_profile(
    args: &ProfileArgs,
    opts: &SessionOptions,
    output: OutputMode,
) -> anyhow::Result<()> {
    let writes = args.set.is_some() || args.from_host.is_some();
    let access = if writes { Access::Write } else { Access::Read };
    let mut session = Session::open(opts, access, output)?;
    let key = session.ledger.keys().user_name.clone();
    let profile = Profile::new(&key, session.config.profile.default_name.as_str());
    let store = session.ledger.store_mut();

    let result = match (&args.set, &args.from_host) {
        (Some(name), _) => profile.set_display_name(store, name),
        (None, Some(host)) => profile.sync_from_host(store, Some(host.as_str())),
        (None, None) => Ok(profile.display_name(&*store)),
    };
    let display_name = match result {
        Ok(name) => name,
        Err(e) => {
            render_error(output, &CliError::with_code(e.code(), e.to_string()))?;
            anyhow::bail!("{e}");
        }
    };
    if writes {
        info!(name = %display_name, "display name updated");
    }

    let report = ProfileOutput {
        display_name,
        updated: writes,
    };
    render_mode(
        output,
        &report,
        |r, w| writeln!(w, "{}", r.display_name),
        |r, w| {
            pretty_section(w, "Profile")?;
            pretty_kv(w, "Display name", &r.display_name)
        },
    )
}
