//! Category page fetching.
//!
//! A page is fetched with a single GET bounded by the configured page load
//! timeout. The markup is only handed on when it contains the element the
//! site uses to signal a rendered listing; otherwise the run stops with
//! [`FetchError::NotReady`].

use crate::error::FetchError;
use crate::utils::truncate_for_log;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info, instrument};

const DEFAULT_USER_AGENT: &str = concat!("newswatch/", env!("CARGO_PKG_VERSION"));

/// HTTP session used for one run. Dropped, with its connection pool, when
/// the run ends.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Build a fetcher whose requests time out after `timeout`.
    pub fn new(timeout: Duration, user_agent: Option<&str>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
            .build()?;
        Ok(Self { client })
    }

    /// GET `url` and return its markup once `ready_css` matches.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Http`] on connection failures and timeouts
    /// - [`FetchError::Status`] on a non-success status
    /// - [`FetchError::Selector`] if `ready_css` is not a valid selector
    /// - [`FetchError::NotReady`] if nothing in the page matches `ready_css`
    #[instrument(level = "info", skip(self))]
    pub async fn fetch(&self, url: &str, ready_css: &str) -> Result<String, FetchError> {
        let ready = Selector::parse(ready_css).map_err(|e| FetchError::Selector {
            selector: ready_css.to_string(),
            reason: e.to_string(),
        })?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let html = response.text().await?;
        debug!(preview = %truncate_for_log(&html, 200), "Received page");

        if !is_ready(&html, &ready) {
            return Err(FetchError::NotReady {
                url: url.to_string(),
                selector: ready_css.to_string(),
            });
        }

        info!(bytes = html.len(), "Loaded the web page");
        Ok(html)
    }
}

/// Whether `html` contains an element matching `ready`.
pub fn is_ready(html: &str, ready: &Selector) -> bool {
    Html::parse_document(html).select(ready).next().is_some()
}
