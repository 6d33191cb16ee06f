//! Client configuration.
//!
//! # Design
//! The API key is part of every request path, so it lives in a `Config` owned
//! by the client rather than in process-wide state. Two clients with different
//! keys never observe each other's credential.

use std::fmt;

use crate::error::{ApiError, Result};
use crate::path::Format;

pub const DEFAULT_BASE_URL: &str = "http://api.defensio.com";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "DEFENSIO_KEY";
/// Environment variable overriding the service host.
pub const HOST_ENV: &str = "DEFENSIO_HOST";

/// Identifier sent as the `client` field of every document post.
pub const CLIENT_ID: &str = concat!(
    "defensio-core | ",
    env!("CARGO_PKG_VERSION"),
    " | Defensio Rust client"
);

const DEFAULT_USER_AGENT: &str = concat!("defensio-core/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    api_key: String,
    pub base_url: String,
    pub format: Format,
    pub user_agent: String,
}

impl Config {
    /// A config for `api_key` against the public service.
    ///
    /// The key is not validated here; operations that need it fail with
    /// `ApiError::MissingApiKey` when it is empty.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            format: Format::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Read `DEFENSIO_KEY` and, if set, `DEFENSIO_HOST`.
    pub fn from_env() -> Self {
        let config = Self::new(std::env::var(API_KEY_ENV).unwrap_or_default());
        match std::env::var(HOST_ENV) {
            Ok(host) if !host.is_empty() => config.with_base_url(&host),
            _ => config,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn check_key(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(ApiError::MissingApiKey);
        }
        Ok(())
    }

    /// `path` with the API key replaced, for logging.
    pub(crate) fn redact(&self, path: &str) -> String {
        if self.api_key.is_empty() {
            return path.to_string();
        }
        path.replace(&self.api_key, "<api-key>")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("")
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("format", &self.format)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
