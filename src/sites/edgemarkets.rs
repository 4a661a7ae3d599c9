//! The Edge Markets, Malaysia category.
//!
//! The grid shows publish times as `18 Oct | 10:30AM`, without a year. The
//! year is taken from today's date and the result is stored in the canonical
//! `%b %d, %Y %I:%M %p` format the timestamp strategy compares on.

use super::{absolute, dedupe, missing, text_in};
use crate::error::ExtractError;
use crate::models::Article;
use crate::watermark::Strategy;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, instrument, warn};

pub const BASE_URL: &str = "https://www.theedgemarkets.com";
pub const ENDPOINT: &str = "/categories/malaysia";
pub const READY: &str = ".views-view-grid";
pub const TIME_FORMAT: &str = "%b %d, %Y %I:%M %p";
pub const STRATEGY: Strategy = Strategy::ByTimestamp { format: TIME_FORMAT };

const SITE: &str = "edgemarkets";
const LISTED_FORMAT: &str = "%Y, %d %b | %I:%M%p";

static GRID: Lazy<Selector> = Lazy::new(|| Selector::parse("div.views-view-grid").unwrap());
static CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.grid.col-lg-4.col-md-4.col-sm-4.col-xs-12").unwrap());
static CREATED: Lazy<Selector> = Lazy::new(|| Selector::parse("div.views-field-created").unwrap());
static TITLE_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.views-field-title a").unwrap());

/// Parse the category grid.
///
/// # Arguments
///
/// * `html` - The loaded category page
/// * `today` - Supplies the year missing from listed times
#[instrument(level = "info", skip(html))]
pub fn extract_articles(html: &str, today: NaiveDate) -> Result<Vec<Article>, ExtractError> {
    let document = Html::parse_document(html);
    let Some(grid) = document.select(&GRID).next() else {
        warn!("No views-view-grid on the page");
        return Ok(Vec::new());
    };

    let mut articles = Vec::new();
    for (index, cell) in grid.select(&CELL).enumerate() {
        let listed =
            text_in(cell, &CREATED).ok_or_else(|| missing(SITE, index, "div.views-field-created"))?;
        let create_time = canonical_time(&listed, today).map_err(|reason| ExtractError {
            site: SITE,
            index,
            reason,
        })?;

        let link = cell
            .select(&TITLE_LINK)
            .next()
            .ok_or_else(|| missing(SITE, index, "div.views-field-title a"))?;
        let url = link
            .value()
            .attr("href")
            .and_then(|href| absolute(BASE_URL, href))
            .ok_or_else(|| missing(SITE, index, "usable href"))?;
        let title = crate::utils::clean_text(&link.text().collect::<String>());

        articles.push(Article::new(url, title).with_create_time(create_time));
    }

    let articles = dedupe(articles);
    debug!(count = articles.len(), "Extracted The Edge Markets listing");
    Ok(articles)
}

/// Convert a listed `18 Oct | 10:30AM` time to `Oct 18, 2024 10:30 AM`.
///
/// A date that would land more than a day after `today` belongs to the
/// previous year (a December article read in January).
pub fn canonical_time(listed: &str, today: NaiveDate) -> Result<String, String> {
    let parse = |year: i32| {
        NaiveDateTime::parse_from_str(&format!("{year}, {}", listed.trim()), LISTED_FORMAT)
    };

    let mut time = parse(today.year())
        .map_err(|e| format!("listed time {listed:?} not understood: {e}"))?;
    if time.date() > today + Duration::days(1) {
        time = parse(today.year() - 1)
            .map_err(|e| format!("listed time {listed:?} not understood: {e}"))?;
    }
    Ok(time.format(TIME_FORMAT).to_string())
}

pub fn email_lines(article: &Article) -> Vec<String> {
    vec![
        format!("Time: {}", article.create_time.as_deref().unwrap_or_default()),
        format!("News: {}", article.title),
        format!("Link: {}", article.url),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const LISTING: &str = r#"
<html><body>
<div class="view-content"><div class="views-view-grid">
  <div class="grid col-lg-4 col-md-4 col-sm-4 col-xs-12">
    <div class="views-field-title"><a href="/node/700100">Petronas posts record profit</a></div>
    <div class="views-field-created"> 18 Oct | 10:30AM </div>
  </div>
  <div class="grid col-lg-4 col-md-4 col-sm-4 col-xs-12">
    <div class="views-field-title"><a href="/node/700099">Ringgit
      steady</a></div>
    <div class="views-field-created">18 Oct | 9:05AM</div>
  </div>
  <div class="grid col-lg-6">
    <div class="views-field-title"><a href="/ad">Not a listing cell</a></div>
  </div>
</div></div>
</body></html>
"#;

    #[test]
    fn test_extract_listing() {
        let articles = extract_articles(LISTING, day(2024, 10, 18)).unwrap();

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].url, "https://www.theedgemarkets.com/node/700100");
        assert_eq!(articles[0].title, "Petronas posts record profit");
        assert_eq!(articles[0].create_time.as_deref(), Some("Oct 18, 2024 10:30 AM"));
        assert_eq!(articles[1].title, "Ringgit steady");
        assert_eq!(articles[1].create_time.as_deref(), Some("Oct 18, 2024 09:05 AM"));
    }

    #[test]
    fn test_extracted_times_are_comparable_by_strategy() {
        let articles = extract_articles(LISTING, day(2024, 10, 18)).unwrap();
        let marker = articles[1].clone();
        let new_items = STRATEGY.select(&articles, &marker).unwrap();
        assert_eq!(new_items, vec![articles[0].clone()]);
    }

    #[test]
    fn test_canonical_time_rolls_back_year_in_january() {
        assert_eq!(
            canonical_time("31 Dec | 11:45PM", day(2025, 1, 1)).unwrap(),
            "Dec 31, 2024 11:45 PM"
        );
        assert_eq!(
            canonical_time("01 Jan | 12:05AM", day(2025, 1, 1)).unwrap(),
            "Jan 01, 2025 12:05 AM"
        );
    }

    #[test]
    fn test_canonical_time_rejects_garbage() {
        assert!(canonical_time("yesterday", day(2024, 10, 18)).is_err());
    }

    #[test]
    fn test_missing_grid_is_empty_listing() {
        assert!(extract_articles("<html></html>", day(2024, 1, 1)).unwrap().is_empty());
    }

    #[test]
    fn test_bad_time_fails_extraction() {
        let html = r#"<div class="views-view-grid">
            <div class="grid col-lg-4 col-md-4 col-sm-4 col-xs-12">
              <div class="views-field-title"><a href="/n/1">x</a></div>
              <div class="views-field-created">soon</div>
            </div></div>"#;
        let err = extract_articles(html, day(2024, 1, 1)).unwrap_err();
        assert_eq!(err.index, 0);
    }

    #[test]
    fn test_email_lines() {
        let article = Article::new("https://www.theedgemarkets.com/node/1", "Ringgit steady")
            .with_create_time("Oct 18, 2024 09:05 AM");
        assert_eq!(
            email_lines(&article),
            vec![
                "Time: Oct 18, 2024 09:05 AM",
                "News: Ringgit steady",
                "Link: https://www.theedgemarkets.com/node/1",
            ]
        );
    }
}
