//! # newswatch
//!
//! Watches a news category page and emails the articles published since the
//! previous run.
//!
//! ## Features
//!
//! - Watches The Star (business), New Straits Times (business) and The Edge
//!   Markets (Malaysia)
//! - Remembers the newest article seen per site in a small JSON marker file
//! - Decides novelty by publish time or by article id/url, depending on what
//!   the site exposes
//! - Sends one plain-text email per run listing the new articles
//!
//! ## Usage
//!
//! ```sh
//! newswatch --site thestar --settings settings.json
//! ```
//!
//! ## Architecture
//!
//! Each run is a straight pipeline:
//! 1. **Fetching**: Load the category page and wait for its listing
//! 2. **Extracting**: Parse the listing into articles, newest first
//! 3. **Filtering**: Compare against the marker and persist the new newest
//! 4. **Notifying**: Email the new articles (failures are logged only)

use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, info_span, Instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod error;
mod fetch;
mod models;
mod notify;
mod pipeline;
mod settings;
mod sites;
mod utils;
mod watermark;

use cli::Cli;
use fetch::PageFetcher;
use notify::{LogNotifier, SmtpNotifier};
use pipeline::{run_site, RunReport};
use settings::Settings;
use utils::error_chain;
use watermark::{MarkerStore, NoveltyFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,html5ever=error,selectors=error"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args.site, ?args.settings, %args.state_dir, dry_run = args.dry_run, "Parsed CLI arguments");

    let span = info_span!("run", site = %args.site);
    let result = run(&args).instrument(span).await;

    let elapsed = start_time.elapsed();
    match &result {
        Ok(report) => info!(
            site = %args.site,
            fetched = report.fetched,
            new = report.new,
            notified = report.notified,
            ?elapsed,
            "Execution complete"
        ),
        Err(e) => error!(site = %args.site, error = %error_chain(e.as_ref()), ?elapsed, "Execution failed"),
    }
    result.map(|_| ())
}

async fn run(args: &Cli) -> Result<RunReport, Box<dyn Error>> {
    info!("newswatch starting up");

    let site = args.site;
    let store = MarkerStore::new(Path::new(&args.state_dir).join(site.marker_file()));
    // Early check: the marker is written at the end of the run
    store.check_writable()?;

    let settings = Settings::load(&args.settings)?;
    let fetcher = PageFetcher::new(settings.page_load_timeout(), settings.user_agent())?;

    let filter = NoveltyFilter::new(site.strategy(), store)
        .rebootstrap_on_corrupt(args.rebootstrap_on_corrupt);
    info!(marker = %filter.store().path().display(), strategy = ?site.strategy(), "Watching site");

    if args.dry_run {
        return run_site(site, &fetcher, &filter, &LogNotifier).await;
    }

    let password = settings.smtp.password_or(args.smtp_password.as_deref())?;
    let notifier = SmtpNotifier::new(&settings.smtp, password);
    run_site(site, &fetcher, &filter, &notifier).await
}
