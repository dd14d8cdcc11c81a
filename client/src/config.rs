//! Editor configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::net::types::UserId;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_USER_ID: UserId = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}: {value:?} ({reason})")]
    Invalid { var: &'static str, value: String, reason: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Service root without a trailing slash.
    pub api_base_url: String,
    /// Owner of uploaded plans and of the plan list.
    pub user_id: UserId,
    /// `limit` for plan list requests.
    pub page_size: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            user_id: DEFAULT_USER_ID,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl EditorConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `FLOORPLAN_API_BASE_URL`: default `http://localhost:8000`
    /// - `FLOORPLAN_USER_ID`: default 1
    /// - `FLOORPLAN_PAGE_SIZE`: default 100, must be positive
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set but unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a value is present but unparsable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = match lookup("FLOORPLAN_API_BASE_URL") {
            Some(raw) => parse_base_url(&raw)?,
            None => DEFAULT_API_BASE_URL.to_owned(),
        };
        let user_id = match lookup("FLOORPLAN_USER_ID") {
            Some(raw) => raw.trim().parse::<UserId>().map_err(|_| ConfigError::Invalid {
                var: "FLOORPLAN_USER_ID",
                value: raw.clone(),
                reason: "expected an integer",
            })?,
            None => DEFAULT_USER_ID,
        };
        let page_size = match lookup("FLOORPLAN_PAGE_SIZE") {
            Some(raw) => parse_page_size(&raw)?,
            None => DEFAULT_PAGE_SIZE,
        };
        Ok(Self { api_base_url, user_id, page_size })
    }
}

fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let url = raw.trim().trim_end_matches('/');
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url.to_owned())
    } else {
        Err(ConfigError::Invalid {
            var: "FLOORPLAN_API_BASE_URL",
            value: raw.to_owned(),
            reason: "expected an http(s) URL",
        })
    }
}

fn parse_page_size(raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Invalid {
            var: "FLOORPLAN_PAGE_SIZE",
            value: raw.to_owned(),
            reason: "expected a positive integer",
        }),
    }
}
