//! Watched news sites.
//!
//! Each site module knows its category page, the element that marks a
//! rendered listing, how to turn that listing into [`Article`]s (newest
//! first), and how an article is laid out in the notification email.
//!
//! # Supported Sites
//!
//! | Site | Module | Novelty | Marker file |
//! |------|--------|---------|-------------|
//! | The Star (Business) | [`thestar`] | identifier (`id`) | `last_news_thestar.json` |
//! | New Straits Times (Business) | [`nst`] | identifier (`url`) | `last_news_nst.json` |
//! | The Edge Markets (Malaysia) | [`edgemarkets`] | timestamp | `last_news_edgemarkets.json` |
//!
//! # Common Patterns
//!
//! Each site module exports:
//! - `extract_articles(html, ..)`: parses the listing
//! - `email_lines(article)`: the lines describing one article in the email
//!
//! Selectors are compiled once with `once_cell::sync::Lazy`.

pub mod edgemarkets;
pub mod nst;
pub mod thestar;

use crate::error::ExtractError;
use crate::models::Article;
use crate::utils::clean_text;
use crate::watermark::Strategy;
use chrono::Local;
use clap::ValueEnum;
use itertools::Itertools;
use scraper::{ElementRef, Selector};
use std::fmt;
use url::Url;

/// A watched site, selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Site {
    /// The Star, latest business news
    #[value(name = "thestar")]
    TheStar,
    /// New Straits Times, business section
    #[value(name = "nst")]
    Nst,
    /// The Edge Markets, Malaysia category
    #[value(name = "edgemarkets")]
    EdgeMarkets,
}

impl Site {
    pub fn name(self) -> &'static str {
        match self {
            Site::TheStar => "thestar",
            Site::Nst => "nst",
            Site::EdgeMarkets => "edgemarkets",
        }
    }

    pub fn page_url(self) -> String {
        match self {
            Site::TheStar => format!("{}{}", thestar::BASE_URL, thestar::ENDPOINT),
            Site::Nst => format!("{}{}", nst::BASE_URL, nst::ENDPOINT),
            Site::EdgeMarkets => format!("{}{}", edgemarkets::BASE_URL, edgemarkets::ENDPOINT),
        }
    }

    /// CSS selector that must match before the page is considered loaded.
    pub fn ready_css(self) -> &'static str {
        match self {
            Site::TheStar => thestar::READY,
            Site::Nst => nst::READY,
            Site::EdgeMarkets => edgemarkets::READY,
        }
    }

    pub fn marker_file(self) -> String {
        format!("last_news_{}.json", self.name())
    }

    pub fn subject(self) -> &'static str {
        match self {
            Site::TheStar => "Notification | The Star.",
            Site::Nst => "Notification | NST.",
            Site::EdgeMarkets => "Notification | The Edge Markets.",
        }
    }

    pub fn strategy(self) -> Strategy {
        match self {
            Site::TheStar => thestar::STRATEGY,
            Site::Nst => nst::STRATEGY,
            Site::EdgeMarkets => edgemarkets::STRATEGY,
        }
    }

    /// Parse the listing out of a loaded category page, newest first.
    pub fn extract(self, html: &str) -> Result<Vec<Article>, ExtractError> {
        match self {
            Site::TheStar => thestar::extract_articles(html),
            Site::Nst => nst::extract_articles(html),
            Site::EdgeMarkets => edgemarkets::extract_articles(html, Local::now().date_naive()),
        }
    }

    pub fn email_lines(self, article: &Article) -> Vec<String> {
        match self {
            Site::TheStar => thestar::email_lines(article),
            Site::Nst => nst::email_lines(article),
            Site::EdgeMarkets => edgemarkets::email_lines(article),
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whitespace-normalized text of the first element under `parent` matching
/// `selector`.
fn text_in(parent: ElementRef<'_>, selector: &Selector) -> Option<String> {
    parent
        .select(selector)
        .next()
        .map(|el| clean_text(&el.text().collect::<String>()))
}

/// Resolve `href` against the site's base URL.
fn absolute(base: &str, href: &str) -> Option<String> {
    Url::parse(base).ok()?.join(href.trim()).ok().map(String::from)
}

/// Drop repeated listings of the same URL, keeping the first occurrence.
fn dedupe(articles: Vec<Article>) -> Vec<Article> {
    articles
        .into_iter()
        .unique_by(|a| a.url.clone())
        .collect()
}

fn missing(site: &'static str, index: usize, what: &str) -> ExtractError {
    ExtractError {
        site,
        index,
        reason: format!("no {what}"),
    }
}
