//! Utility functions for text cleanup, logging and file system checks.
//!
//! - Whitespace normalization for text pulled out of HTML
//! - String truncation for log previews
//! - Error rendering with the full cause chain for logs

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse runs of whitespace (including newlines and tabs) into single
/// spaces and trim both ends.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(clean_text("  Ringgit\n\t opens  higher "), "Ringgit opens higher");
/// ```
pub fn clean_text(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at the last character boundary before `max` bytes
/// with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Render an error with its whole `source()` chain, outermost first.
///
/// # Examples
///
/// ```ignore
/// // "Marker file last_news_nst.json I/O error: permission denied"
/// error!(error = %error_chain(&e), "Execution failed");
/// ```
pub fn error_chain(e: &dyn Error) -> String {
    let mut rendered = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

/// Fresh, empty directory under the system temp dir for one test.
#[cfg(test)]
pub fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("newswatch-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
