//! Settings file loading.
//!
//! The settings file keeps the layout the watcher has always used, where
//! scalar options are wrapped in `{"value": ...}` objects:
//!
//! ```json
//! {
//!   "page_load_timeout": { "value": 30 },
//!   "smtp": {
//!     "mail": "me@gmail.com",
//!     "password": "app-password",
//!     "to": "a@example.com,b@example.com"
//!   }
//! }
//! ```
//!
//! Files ending in `.yaml` or `.yml` are parsed as YAML with the same shape.
//! Unknown keys are ignored.

use crate::error::SettingsError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 465;
const DEFAULT_PAGE_LOAD_TIMEOUT_SECS: u64 = 30;

/// A scalar option wrapped as `{"value": ...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Setting<T> {
    pub value: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Seconds to wait for a category page to load.
    #[serde(default)]
    pub page_load_timeout: Option<Setting<u64>>,
    /// User agent sent with page requests.
    #[serde(default)]
    pub user_agent: Option<Setting<String>>,
    pub smtp: SmtpSettings,
}

/// SMTP credentials and recipients.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpSettings {
    /// Sender address, also used as the SMTP login.
    pub mail: String,
    #[serde(default)]
    pub password: Option<String>,
    /// Comma-separated recipients.
    pub to: String,
    #[serde(default = "default_smtp_host")]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
}

fn default_smtp_host() -> String {
    DEFAULT_SMTP_HOST.to_string()
}

fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

impl Settings {
    /// Load settings from a JSON or YAML file, choosing by extension.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        let settings = if is_yaml {
            Self::from_yaml(&raw)?
        } else {
            Self::from_json(&raw)?
        };
        debug!(
            smtp_host = %settings.smtp.host,
            smtp_port = settings.smtp.port,
            recipients = settings.smtp.recipients().len(),
            "Loaded settings"
        );
        Ok(settings)
    }

    pub fn from_json(raw: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, SettingsError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(
            self.page_load_timeout
                .as_ref()
                .map_or(DEFAULT_PAGE_LOAD_TIMEOUT_SECS, |s| s.value),
        )
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_ref().map(|s| s.value.as_str())
    }
}

impl SmtpSettings {
    /// Recipients split on commas, trimmed, empties dropped.
    pub fn recipients(&self) -> Vec<&str> {
        self.to
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// The password, with `override_password` taking precedence.
    pub fn password_or<'a>(&'a self, override_password: Option<&'a str>) -> Result<&'a str, SettingsError> {
        override_password
            .or(self.password.as_deref())
            .ok_or(SettingsError::Missing("smtp.password"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::scratch_dir;

    const LEGACY_JSON: &str = r#"{
        "driver_path": { "value": "/usr/bin/chromedriver" },
        "page_load_timeout": { "value": 45 },
        "smtp": {
            "mail": "watcher@gmail.com",
            "password": "secret",
            "to": "a@example.com, b@example.com,"
        }
    }"#;

    #[test]
    fn test_legacy_json_layout() {
        let settings = Settings::from_json(LEGACY_JSON).unwrap();

        assert_eq!(settings.page_load_timeout(), Duration::from_secs(45));
        assert_eq!(settings.smtp.mail, "watcher@gmail.com");
        assert_eq!(settings.smtp.host, "smtp.gmail.com");
        assert_eq!(settings.smtp.port, 465);
        assert_eq!(settings.smtp.recipients(), vec!["a@example.com", "b@example.com"]);
        assert_eq!(settings.user_agent(), None);
    }

    #[test]
    fn test_defaults_when_optional_keys_absent() {
        let settings =
            Settings::from_json(r#"{ "smtp": { "mail": "m@x.com", "to": "t@x.com" } }"#).unwrap();

        assert_eq!(settings.page_load_timeout(), Duration::from_secs(30));
        assert!(matches!(
            settings.smtp.password_or(None),
            Err(SettingsError::Missing("smtp.password"))
        ));
        assert_eq!(settings.smtp.password_or(Some("env")).unwrap(), "env");
    }

    #[test]
    fn test_password_override_wins() {
        let settings = Settings::from_json(LEGACY_JSON).unwrap();
        assert_eq!(settings.smtp.password_or(None).unwrap(), "secret");
        assert_eq!(settings.smtp.password_or(Some("other")).unwrap(), "other");
    }

    #[test]
    fn test_yaml_layout() {
        let yaml = r#"
page_load_timeout:
  value: 10
user_agent:
  value: newswatch/0.1
smtp:
  mail: watcher@example.com
  to: ops@example.com
  host: mail.example.com
  port: 2465
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.page_load_timeout(), Duration::from_secs(10));
        assert_eq!(settings.user_agent(), Some("newswatch/0.1"));
        assert_eq!(settings.smtp.host, "mail.example.com");
        assert_eq!(settings.smtp.port, 2465);
    }

    #[test]
    fn test_missing_smtp_is_an_error() {
        let err = Settings::from_json(r#"{ "page_load_timeout": { "value": 5 } }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Json(_)));
    }

    #[test]
    fn test_load_picks_parser_by_extension() {
        let dir = scratch_dir("settings-load");
        let json_path = dir.join("settings.json");
        let yaml_path = dir.join("settings.yml");
        std::fs::write(&json_path, LEGACY_JSON).unwrap();
        std::fs::write(&yaml_path, "smtp:\n  mail: m@x.com\n  to: t@x.com\n").unwrap();

        assert_eq!(Settings::load(&json_path).unwrap().smtp.mail, "watcher@gmail.com");
        assert_eq!(Settings::load(&yaml_path).unwrap().smtp.mail, "m@x.com");
        assert!(matches!(
            Settings::load(&dir.join("absent.json")),
            Err(SettingsError::Read { .. })
        ));
    }
}
