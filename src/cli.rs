//! Command-line interface definitions for newswatch.
//!
//! Every run watches exactly one site. Schedule one invocation per site
//! (e.g. from cron) and never run two for the same site at once: the marker
//! file is not locked.

use crate::sites::Site;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for one watcher run.
///
/// # Examples
///
/// ```sh
/// # Check The Star and email what is new
/// newswatch --site thestar
///
/// # Use a YAML settings file and keep markers elsewhere
/// newswatch --site edgemarkets --settings /etc/newswatch.yaml --state-dir /var/lib/newswatch
///
/// # Log the email instead of sending it
/// newswatch --site nst --dry-run
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Site to check
    #[arg(short, long, value_enum)]
    pub site: Site,

    /// Settings file (JSON, or YAML with a .yaml/.yml extension)
    #[arg(short = 'c', long, env = "NEWSWATCH_SETTINGS", default_value = "settings.json")]
    pub settings: PathBuf,

    /// Directory holding the per-site marker files
    #[arg(short = 'd', long, env = "NEWSWATCH_STATE_DIR", default_value = ".")]
    pub state_dir: String,

    /// SMTP password, overriding the one in the settings file
    #[arg(long, env = "NEWSWATCH_SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: Option<String>,

    /// Log the email instead of sending it
    #[arg(long)]
    pub dry_run: bool,

    /// Treat an unreadable or incompatible marker as absent and report the
    /// whole listing again, instead of failing
    #[arg(long)]
    pub rebootstrap_on_corrupt: bool,
}
