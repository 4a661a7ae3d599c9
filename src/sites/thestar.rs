//! The Star latest business news.
//!
//! Every listing tile is an `li.row` holding an anchor tagged with
//! `data-content-id`. That id is stable across edits of the headline and is
//! what the marker is keyed on.

use super::{absolute, dedupe, missing, text_in};
use crate::error::ExtractError;
use crate::models::Article;
use crate::utils::clean_text;
use crate::watermark::{IdentityKey, Strategy};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, instrument};

pub const BASE_URL: &str = "https://www.thestar.com.my";
pub const ENDPOINT: &str = "/news/latest?tag=Business";
pub const READY: &str = "[id='2a']";
pub const STRATEGY: Strategy = Strategy::ByIdentifier { key: IdentityKey::Id };

const SITE: &str = "thestar";

static TILE: Lazy<Selector> = Lazy::new(|| Selector::parse("li.row").unwrap());
static CONTENT_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[data-content-id]").unwrap());
static TIMESTAMP: Lazy<Selector> = Lazy::new(|| Selector::parse("time.timestamp").unwrap());
static KICKER: Lazy<Selector> = Lazy::new(|| Selector::parse("a.kicker").unwrap());

/// Parse the latest-news listing.
///
/// The kicker (section label) becomes the title and the headline anchor text
/// becomes the description, matching how the email labels them.
#[instrument(level = "info", skip_all)]
pub fn extract_articles(html: &str) -> Result<Vec<Article>, ExtractError> {
    let document = Html::parse_document(html);
    let mut articles = Vec::new();

    for (index, tile) in document.select(&TILE).enumerate() {
        let link = tile
            .select(&CONTENT_LINK)
            .next()
            .ok_or_else(|| missing(SITE, index, "a[data-content-id]"))?;
        let id = link
            .value()
            .attr("data-content-id")
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| missing(SITE, index, "data-content-id value"))?;
        let url = link
            .value()
            .attr("href")
            .and_then(|href| absolute(BASE_URL, href))
            .ok_or_else(|| missing(SITE, index, "usable href"))?;
        let create_time =
            text_in(tile, &TIMESTAMP).ok_or_else(|| missing(SITE, index, "time.timestamp"))?;
        let kicker = text_in(tile, &KICKER).ok_or_else(|| missing(SITE, index, "a.kicker"))?;
        let headline = clean_text(&link.text().collect::<String>());

        articles.push(
            Article::new(url, kicker)
                .with_id(id)
                .with_create_time(create_time)
                .with_description(headline),
        );
    }

    let articles = dedupe(articles);
    debug!(count = articles.len(), "Extracted The Star listing");
    Ok(articles)
}

pub fn email_lines(article: &Article) -> Vec<String> {
    vec![
        format!("Time: {}", article.create_time.as_deref().unwrap_or_default()),
        format!("Category: {}", article.title),
        format!("News: {}", article.description.as_deref().unwrap_or_default()),
        format!("Link: {}", article.url),
    ]
}
