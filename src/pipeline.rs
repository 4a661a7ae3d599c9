//! One watcher run for one site: fetch, extract, filter, notify.

use crate::error::FilterError;
use crate::fetch::PageFetcher;
use crate::models::Article;
use crate::notify::{compose, Notifier};
use crate::sites::Site;
use crate::utils::error_chain;
use crate::watermark::NoveltyFilter;
use std::error::Error;
use tracing::{error, info, instrument};

/// What a run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub fetched: usize,
    pub new: usize,
    /// Whether an email went out. `false` both when there was nothing to
    /// report and when delivery failed.
    pub notified: bool,
}

/// Fetch the site's category page and process its listing.
#[instrument(level = "info", skip_all, fields(%site))]
pub async fn run_site<N: Notifier>(
    site: Site,
    fetcher: &PageFetcher,
    filter: &NoveltyFilter,
    notifier: &N,
) -> Result<RunReport, Box<dyn Error>> {
    let url = site.page_url();
    let html = fetcher.fetch(&url, site.ready_css()).await?;
    let fetched = site.extract(&html)?;
    info!(count = fetched.len(), %url, "Extracted listing");

    Ok(process_listing(site, &fetched, filter, notifier).await?)
}

/// Filter `fetched` against the marker and notify about what is new.
///
/// The marker is persisted by the filter before the notifier runs, so a
/// delivery failure does not cause the same articles to be reported again.
///
/// # Errors
///
/// Only filter failures are returned; notifier failures are logged.
#[instrument(level = "info", skip_all, fields(%site, fetched = fetched.len()))]
pub async fn process_listing<N: Notifier>(
    site: Site,
    fetched: &[Article],
    filter: &NoveltyFilter,
    notifier: &N,
) -> Result<RunReport, FilterError> {
    let new_items = filter.run(fetched)?;
    info!(count = new_items.len(), "Fetched recent news");

    let mut report = RunReport {
        fetched: fetched.len(),
        new: new_items.len(),
        notified: false,
    };

    if new_items.is_empty() {
        info!("No recent news. No email is triggered.");
        return Ok(report);
    }

    let email = compose(site, &new_items);
    match notifier.notify(&email).await {
        Ok(()) => report.notified = true,
        Err(e) => {
            error!(error = %error_chain(&e), "Error sending the email; check the SMTP settings");
        }
    }
    Ok(report)
}
