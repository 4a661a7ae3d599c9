//! New Straits Times business section.
//!
//! Teasers carry no stable id and only a relative publish time
//! ("2 hours ago"), so the marker is keyed on the article URL.

use super::{absolute, dedupe, missing, text_in};
use crate::error::ExtractError;
use crate::models::Article;
use crate::watermark::{IdentityKey, Strategy};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, instrument};

pub const BASE_URL: &str = "https://www.nst.com.my";
pub const ENDPOINT: &str = "/business";
pub const READY: &str = ".container-fluid";
pub const STRATEGY: Strategy = Strategy::ByIdentifier { key: IdentityKey::Url };

const SITE: &str = "nst";
const SPONSORED_CLASS: &str = "native-loaded";

static TEASER: Lazy<Selector> = Lazy::new(|| Selector::parse("div.article-teaser").unwrap());
static CREATED: Lazy<Selector> = Lazy::new(|| Selector::parse("span.created-ago").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("h3.field-title").unwrap());

/// Parse the business teasers, skipping sponsored (`native-loaded`) cards.
#[instrument(level = "info", skip_all)]
pub fn extract_articles(html: &str) -> Result<Vec<Article>, ExtractError> {
    let document = Html::parse_document(html);
    let mut articles = Vec::new();

    for (index, card) in document.select(&TEASER).enumerate() {
        if card.value().classes().any(|c| c == SPONSORED_CLASS) {
            continue;
        }

        let create_time =
            text_in(card, &CREATED).ok_or_else(|| missing(SITE, index, "span.created-ago"))?;
        let url = card
            .select(&LINK)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| absolute(BASE_URL, href))
            .ok_or_else(|| missing(SITE, index, "a[href]"))?;
        let title = text_in(card, &TITLE).ok_or_else(|| missing(SITE, index, "h3.field-title"))?;

        articles.push(Article::new(url, title).with_create_time(create_time));
    }

    let articles = dedupe(articles);
    debug!(count = articles.len(), "Extracted NST listing");
    Ok(articles)
}

pub fn email_lines(article: &Article) -> Vec<String> {
    vec![
        format!("Time: {}", article.create_time.as_deref().unwrap_or_default()),
        format!("Category: {}", article.title),
        format!("Link: {}", article.url),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
<html><body><div class="container-fluid">
  <div class="article-teaser">
    <a href="/business/2024/01/1001/ringgit-opens-higher">
      <h3 class="field-title"> Ringgit opens higher </h3>
    </a>
    <span class="created-ago"> 5 minutes ago </span>
  </div>
  <div class="article-teaser native-loaded">
    <a href="https://sponsor.example/promo"><h3 class="field-title">Sponsored</h3></a>
  </div>
  <div class="article-teaser">
    <a href="/business/2024/01/1000/bursa-ends-lower">
      <h3 class="field-title">Bursa ends lower</h3>
    </a>
    <span class="created-ago">1 hour ago</span>
  </div>
</div></body></html>
"#;

    #[test]
    fn test_extract_listing_skips_sponsored() {
        let articles = extract_articles(LISTING).unwrap();

        assert_eq!(articles.len(), 2);
        assert_eq!(
            articles[0].url,
            "https://www.nst.com.my/business/2024/01/1001/ringgit-opens-higher"
        );
        assert_eq!(articles[0].title, "Ringgit opens higher");
        assert_eq!(articles[0].create_time.as_deref(), Some("5 minutes ago"));
        assert_eq!(articles[0].id, None);
        assert_eq!(articles[1].title, "Bursa ends lower");
    }

    #[test]
    fn test_teaser_without_title_fails() {
        let html = r#"<div class="article-teaser"><a href="/x"></a><span class="created-ago">now</span></div>"#;
        let err = extract_articles(html).unwrap_err();
        assert!(err.reason.contains("h3.field-title"));
    }

    #[test]
    fn test_email_lines() {
        let article = Article::new("https://www.nst.com.my/x", "Bursa ends lower")
            .with_create_time("1 hour ago");
        assert_eq!(
            email_lines(&article),
            vec![
                "Time: 1 hour ago",
                "Category: Bursa ends lower",
                "Link: https://www.nst.com.my/x",
            ]
        );
    }
}
