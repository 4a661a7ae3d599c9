//! Data models for scraped article listings.
//!
//! This module defines the record that flows through every stage of a run:
//! - [`Article`]: one entry of a category page listing, as extracted from
//!   the site's markup and as persisted in the marker file
//!
//! Optional fields are only populated by the sites that expose them and are
//! omitted from the serialized JSON when absent, so a marker file written for
//! one site only carries the keys that site knows about.

use serde::{Deserialize, Serialize};

/// A single article as listed on a news category page.
///
/// The same struct is used for freshly extracted listings and for the
/// persisted marker. Which of `create_time` and `id` is significant depends on
/// the site's [`Strategy`](crate::watermark::Strategy).
///
/// # Fields
///
/// * `url` - Absolute link to the article
/// * `title` - Display title (or kicker/category, depending on the site)
/// * `create_time` - Publish time in the site's canonical format
/// * `id` - Opaque site-assigned identifier
/// * `description` - Teaser text carried through to the notification
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    /// Absolute URL of the article.
    pub url: String,
    /// Display title.
    pub title: String,
    /// Publish time as shown by the site, normalized to the site's format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    /// Site-assigned identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Teaser text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Article {
    /// Build an article carrying only the two mandatory fields.
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            create_time: None,
            id: None,
            description: None,
        }
    }

    pub fn with_create_time(mut self, create_time: impl Into<String>) -> Self {
        self.create_time = Some(create_time.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
