//! Versioned REST path construction.
//!
//! Every Defensio resource lives under
//! `/{API_VERSION}/users/{api_key}[/{action}][/{id}].{format}`. The action and
//! id are interpolated as given; callers pass URL-safe tokens.

use std::fmt;

use crate::config::Config;
use crate::error::{ApiError, Result};

/// Version segment prefixed to every path.
pub const API_VERSION: &str = "2.0";

pub const ACTION_BASIC_STATS: &str = "basic-stats";
pub const ACTION_EXTENDED_STATS: &str = "extended-stats";
pub const ACTION_PROFANITY_FILTER: &str = "profanity-filter";
pub const ACTION_DOCUMENTS: &str = "documents";

/// Serialization format of service responses.
///
/// Only `Json` is implemented. `Xml` exists so a misconfigured client fails
/// with `ApiError::UnsupportedFormat` instead of mis-reading a reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Json,
    Xml,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Xml => "xml",
        }
    }

    /// Returns an error unless this format can be parsed by the client.
    pub fn ensure_supported(self) -> Result<()> {
        match self {
            Format::Json => Ok(()),
            other => Err(ApiError::UnsupportedFormat(other)),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Build the path for `action` and `id` under the configured user.
pub fn api_path(config: &Config, action: Option<&str>, id: Option<&str>) -> Result<String> {
    config.check_key()?;
    config.format.ensure_supported()?;

    let mut path = format!("/{API_VERSION}/users/{}", config.api_key());
    if let Some(action) = action {
        path.push('/');
        path.push_str(action);
    }
    if let Some(id) = id {
        path.push('/');
        path.push_str(id);
    }
    path.push('.');
    path.push_str(config.format.extension());
    Ok(path)
}
