//! Per-site marker file.
//!
//! The marker is a single [`Article`] serialized as a pretty-printed JSON
//! object. Saving replaces the whole file; no history is kept.

use crate::error::FilterError;
use crate::models::Article;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Handle on the marker file of one site.
///
/// The file is shared across process invocations and is not locked: two runs
/// for the same site at the same time race on it.
#[derive(Debug, Clone)]
pub struct MarkerStore {
    path: PathBuf,
}

impl MarkerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted marker.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` when the file does not exist (bootstrap)
    /// * `Ok(Some(article))` when it holds a valid article object
    ///
    /// # Errors
    ///
    /// [`FilterError::CorruptState`] if the file is not valid UTF-8 JSON or
    /// lacks a required field, [`FilterError::Io`] for any other read failure.
    #[instrument(level = "debug", skip_all, fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<Option<Article>, FilterError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No marker file");
                return Ok(None);
            }
            Err(source) => {
                return Err(FilterError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let marker: Article =
            serde_json::from_slice(&raw).map_err(|e| self.corrupt(e.to_string()))?;
        debug!(url = %marker.url, "Loaded marker");
        Ok(Some(marker))
    }

    /// Persist `article` as the new marker.
    ///
    /// The JSON is written to a sibling `.tmp` file first and renamed over the
    /// marker, so an interrupted write leaves the previous marker in place.
    #[instrument(level = "debug", skip_all, fields(path = %self.path.display()))]
    pub fn save(&self, article: &Article) -> Result<(), FilterError> {
        let json = serde_json::to_string_pretty(article).map_err(|source| FilterError::Encode {
            path: self.path.clone(),
            source,
        })?;

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, json).map_err(|source| FilterError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| FilterError::Io {
            path: self.path.clone(),
            source,
        })?;

        info!(url = %article.url, "Saved marker");
        Ok(())
    }

    /// Check that the marker can be written, before any network I/O.
    ///
    /// Creates the marker's directory if needed, then creates and removes the
    /// same `.tmp` sibling that [`save`](Self::save) writes through. An
    /// existing marker is neither read nor touched.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub fn check_writable(&self) -> Result<(), FilterError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| FilterError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let tmp_path = self.tmp_path();
        let io_err = |source| FilterError::Io {
            path: tmp_path.clone(),
            source,
        };
        fs::write(&tmp_path, b"").map_err(io_err)?;
        fs::remove_file(&tmp_path).map_err(io_err)?;

        info!("Marker location is writable");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        PathBuf::from(tmp_name)
    }

    pub(crate) fn corrupt(&self, reason: impl Into<String>) -> FilterError {
        FilterError::CorruptState {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }
}
