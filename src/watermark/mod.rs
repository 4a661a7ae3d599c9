//! Watermark-based novelty filter.
//!
//! Given a freshly fetched listing (newest first) and the marker persisted by
//! the previous run, decide which articles are new and move the marker to the
//! newest of them.
//!
//! # Strategies
//!
//! | Strategy | New when | Marker not usable |
//! |----------|----------|-------------------|
//! | [`Strategy::ByTimestamp`] | `create_time` is strictly later than the marker's | marker has no parseable `create_time` |
//! | [`Strategy::ByIdentifier`] | it precedes the marker's id/url in the listing | marker lacks the keyed field |
//!
//! With the identifier strategy, a marker that no longer appears in the
//! listing means the site's window moved past it and the whole listing is new.
//!
//! # Bootstrap
//!
//! Without a marker the whole listing is reported once and its first entry
//! becomes the marker.

mod store;

pub use store::MarkerStore;

use crate::error::FilterError;
use crate::models::Article;
use chrono::NaiveDateTime;
use tracing::{debug, info, instrument, warn};

/// Which field identifies an article for [`Strategy::ByIdentifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKey {
    Id,
    Url,
}

impl IdentityKey {
    fn name(self) -> &'static str {
        match self {
            IdentityKey::Id => "id",
            IdentityKey::Url => "url",
        }
    }

    fn of(self, article: &Article) -> Option<&str> {
        match self {
            IdentityKey::Id => article.id.as_deref(),
            IdentityKey::Url => Some(article.url.as_str()).filter(|u| !u.is_empty()),
        }
    }
}

/// How a site decides novelty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Compare `create_time` parsed with a chrono format string.
    ByTimestamp { format: &'static str },
    /// Scan for the marker's identity.
    ByIdentifier { key: IdentityKey },
}

/// Why [`Strategy::validate`] or [`Strategy::select`] could not decide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// A fetched article is unusable.
    Article { url: String, reason: String },
    /// The marker is unusable.
    Marker(String),
}

impl Strategy {
    /// Check that every article carries the field this strategy keys on, and
    /// for timestamps that it parses.
    ///
    /// A single malformed entry rejects the whole listing instead of
    /// vanishing, whether or not a marker exists yet.
    pub fn validate(&self, fetched: &[Article]) -> Result<(), Rejection> {
        for article in fetched {
            match *self {
                Strategy::ByTimestamp { format } => {
                    article_time(article, format)?;
                }
                Strategy::ByIdentifier { key } => {
                    if key.of(article).is_none() {
                        return Err(Rejection::Article {
                            url: article.url.clone(),
                            reason: format!("missing {}", key.name()),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Select the articles of `fetched` that are newer than `marker`.
    ///
    /// The listing is [validated](Self::validate) first. The result keeps
    /// the order of `fetched`.
    pub fn select(&self, fetched: &[Article], marker: &Article) -> Result<Vec<Article>, Rejection> {
        self.validate(fetched)?;

        match *self {
            Strategy::ByTimestamp { format } => {
                let cutoff = marker
                    .create_time
                    .as_deref()
                    .ok_or_else(|| Rejection::Marker("missing create_time".to_string()))
                    .and_then(|raw| parse_time(raw, format).map_err(Rejection::Marker))?;

                let mut new_items = Vec::new();
                for article in fetched {
                    if article_time(article, format)? > cutoff {
                        new_items.push(article.clone());
                    }
                }
                Ok(new_items)
            }
            Strategy::ByIdentifier { key } => {
                let last_seen = key
                    .of(marker)
                    .ok_or_else(|| Rejection::Marker(format!("missing {}", key.name())))?;

                Ok(fetched
                    .iter()
                    .take_while(|a| key.of(a) != Some(last_seen))
                    .cloned()
                    .collect())
            }
        }
    }
}

fn article_time(article: &Article, format: &str) -> Result<NaiveDateTime, Rejection> {
    let raw = article.create_time.as_deref().ok_or_else(|| Rejection::Article {
        url: article.url.clone(),
        reason: "missing create_time".to_string(),
    })?;
    parse_time(raw, format).map_err(|reason| Rejection::Article {
        url: article.url.clone(),
        reason,
    })
}

fn parse_time(raw: &str, format: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw.trim(), format)
        .map_err(|e| format!("create_time {raw:?} does not match {format:?}: {e}"))
}

/// Novelty filter bound to one site's strategy and marker file.
#[derive(Debug)]
pub struct NoveltyFilter {
    strategy: Strategy,
    store: MarkerStore,
    rebootstrap_on_corrupt: bool,
}

impl NoveltyFilter {
    pub fn new(strategy: Strategy, store: MarkerStore) -> Self {
        Self {
            strategy,
            store,
            rebootstrap_on_corrupt: false,
        }
    }

    /// Treat an unusable marker as if there were none instead of failing.
    pub fn rebootstrap_on_corrupt(mut self, enabled: bool) -> Self {
        self.rebootstrap_on_corrupt = enabled;
        self
    }

    pub fn store(&self) -> &MarkerStore {
        &self.store
    }

    /// Return the new articles of `fetched` and persist the newest as marker.
    ///
    /// # Arguments
    ///
    /// * `fetched` - The listing, newest first
    ///
    /// # Returns
    ///
    /// The new articles in listing order. The marker file is only written
    /// when this is non-empty.
    ///
    /// # Errors
    ///
    /// - [`FilterError::Parse`] if a fetched article is malformed
    /// - [`FilterError::CorruptState`] if the marker is unusable and
    ///   re-bootstrapping was not requested
    /// - [`FilterError::Io`] if the marker cannot be read or written
    #[instrument(level = "info", skip_all, fields(fetched = fetched.len(), marker = %self.store.path().display()))]
    pub fn run(&self, fetched: &[Article]) -> Result<Vec<Article>, FilterError> {
        let Some(newest) = fetched.first() else {
            info!("Empty listing; nothing to do");
            return Ok(Vec::new());
        };

        if let Err(rejection) = self.strategy.validate(fetched) {
            return Err(self.reject(rejection));
        }

        let marker = match self.store.load() {
            Ok(marker) => marker,
            Err(e @ FilterError::CorruptState { .. }) if self.rebootstrap_on_corrupt => {
                warn!(error = %e, "Ignoring corrupt marker");
                None
            }
            Err(e) => return Err(e),
        };

        let Some(marker) = marker else {
            return self.bootstrap(fetched, newest);
        };

        let new_items = match self.strategy.select(fetched, &marker) {
            Ok(items) => items,
            Err(Rejection::Marker(reason)) if self.rebootstrap_on_corrupt => {
                warn!(%reason, "Marker unusable for this strategy; ignoring it");
                return self.bootstrap(fetched, newest);
            }
            Err(rejection) => return Err(self.reject(rejection)),
        };

        match new_items.first() {
            Some(first) => {
                self.store.save(first)?;
                info!(new = new_items.len(), "Found new articles");
            }
            None => debug!("No article newer than the marker"),
        }
        Ok(new_items)
    }

    fn reject(&self, rejection: Rejection) -> FilterError {
        match rejection {
            Rejection::Article { url, reason } => FilterError::Parse { url, reason },
            Rejection::Marker(reason) => self.store.corrupt(reason),
        }
    }

    fn bootstrap(&self, fetched: &[Article], newest: &Article) -> Result<Vec<Article>, FilterError> {
        info!(url = %newest.url, "No marker yet; reporting the full listing");
        self.store.save(newest)?;
        Ok(fetched.to_vec())
    }
}
