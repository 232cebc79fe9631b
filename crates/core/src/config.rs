//! Runtime configuration for the transport and record store.
//!
//! Configuration is an explicit value handed to constructors. It is read from
//! a YAML file and then overridden by `GSHEET_*` environment variables.

use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default Sheets API endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://sheets.googleapis.com";

/// Environment variable that holds the access token by default.
pub const DEFAULT_TOKEN_ENV: &str = "GSHEET_ACCESS_TOKEN";

/// Connection settings for one spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Base URL of the Sheets API, without the `/v4` suffix.
    pub api_base_url: String,
    /// Identifier of the spreadsheet document.
    pub spreadsheet_id: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Name of the environment variable the access token is read from.
    pub token_env: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            spreadsheet_id: String::new(),
            timeout_secs: 30,
            token_env: DEFAULT_TOKEN_ENV.to_string(),
        }
    }
}

impl StoreConfig {
    /// Configuration for `spreadsheet_id` with every other option defaulted.
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        StoreConfig {
            spreadsheet_id: spreadsheet_id.into(),
            ..Self::default()
        }
    }

    /// Point the configuration at another API endpoint.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(source: &str) -> StoreResult<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Read a YAML configuration file.
    pub fn from_file(path: &Path) -> StoreResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&source)
    }

    /// `<config dir>/gsheet/config.yaml`, when the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("gsheet");
            p.push("config.yaml");
            p
        })
    }

    /// Load from `path` (or the default path when it exists), apply
    /// environment overrides, and validate.
    pub fn load(path: Option<&Path>) -> StoreResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `GSHEET_API_BASE_URL`, `GSHEET_SPREADSHEET_ID` and
    /// `GSHEET_TIMEOUT_SECS` from `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> StoreResult<()> {
        if let Some(url) = lookup("GSHEET_API_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(id) = lookup("GSHEET_SPREADSHEET_ID") {
            self.spreadsheet_id = id;
        }
        if let Some(secs) = lookup("GSHEET_TIMEOUT_SECS") {
            self.timeout_secs = secs.parse().map_err(|_| {
                StoreError::Config(format!("GSHEET_TIMEOUT_SECS is not a number: {secs}"))
            })?;
        }
        Ok(())
    }

    /// Reject configurations no request could be built from.
    pub fn validate(&self) -> StoreResult<()> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err(StoreError::Config("spreadsheet_id is not set".to_string()));
        }
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(StoreError::Config(format!(
                "api_base_url must be an http(s) URL: {}",
                self.api_base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(StoreError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}
