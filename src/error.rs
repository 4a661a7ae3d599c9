//! Error types for each stage of a run.
//!
//! Only [`FilterError`] belongs to the novelty filter itself. The others are
//! raised by the collaborators around it and are handled differently by the
//! pipeline: notification failures are logged and swallowed, everything else
//! aborts the run for the site.

use std::path::PathBuf;

/// Failures of the watermark filter and its marker file.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// A fetched article lacks a field the strategy needs, or its timestamp
    /// does not match the site's format.
    #[error("Failed to parse article {url}: {reason}")]
    Parse { url: String, reason: String },

    /// The persisted marker cannot be used as a cutoff.
    #[error("Marker file {} is corrupt: {reason}", .path.display())]
    CorruptState { path: PathBuf, reason: String },

    #[error("Marker file {} I/O error", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode marker for {}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures delivering an email notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Invalid email address {address:?}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("Failed to build email")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP transport error")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Failures loading a category page.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Invalid readiness selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    /// The page loaded but the element that marks a rendered listing is absent.
    #[error("{url} is not ready: no element matches {selector:?}")]
    NotReady { url: String, selector: String },
}

/// A listing entry is missing a node the site's layout guarantees.
#[derive(Debug, thiserror::Error)]
#[error("Listing entry #{index} on {site}: {reason}")]
pub struct ExtractError {
    pub site: &'static str,
    pub index: usize,
    pub reason: String,
}

/// Failures loading the settings file.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON settings")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML settings")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Missing setting: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_error_messages() {
        let err = FilterError::Parse {
            url: "https://example.com/a".to_string(),
            reason: "missing create_time".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse article https://example.com/a: missing create_time"
        );

        let err = FilterError::CorruptState {
            path: PathBuf::from("last_news_nst.json"),
            reason: "missing field `url`".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Marker file last_news_nst.json is corrupt: missing field `url`"
        );
    }

    #[test]
    fn test_encode_error_is_not_corrupt_state() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = FilterError::Encode {
            path: PathBuf::from("last_news_nst.json"),
            source,
        };
        assert_eq!(err.to_string(), "Failed to encode marker for last_news_nst.json");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_extract_error_message() {
        let err = ExtractError {
            site: "thestar",
            index: 3,
            reason: "no time.timestamp".to_string(),
        };
        assert_eq!(err.to_string(), "Listing entry #3 on thestar: no time.timestamp");
    }
}
