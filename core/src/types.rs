//! Request and response types for the Defensio API.
//!
//! # Design
//! Payloads stay as `serde_json` maps; the service returns loosely shaped
//! objects and the client only reshapes what it must. The exception is
//! extended statistics, whose `date` strings are parsed into `NaiveDate`.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use crate::envelope::{Payload, ServiceResponse};
use crate::error::{ApiError, Result};

/// Option keys a document may carry. Anything else is dropped.
pub const ALLOWED_OPTIONS: [&str; 6] = [
    "type",
    "platform",
    "author-email",
    "author-ip",
    "content",
    "signature",
];

/// Whitelisted document fields, kept in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentOptions {
    fields: BTreeMap<String, String>,
}

impl DocumentOptions {
    /// Keep only the entries whose key is in `ALLOWED_OPTIONS`.
    pub fn filter<I, K, V>(options: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut fields = BTreeMap::new();
        for (key, value) in options {
            let key = key.into();
            if ALLOWED_OPTIONS.contains(&key.as_str()) {
                fields.insert(key, value.into());
            } else {
                tracing::debug!(option = %key, "dropping unsupported document option");
            }
        }
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn content(&self) -> Option<&str> {
        self.get("content")
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Query for `extended-stats`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedStatsQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Additional parameters passed through verbatim.
    pub extra: Vec<(String, String)>,
}

impl ExtendedStatsQuery {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from,
            to,
            extra: Vec::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    pub(crate) fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("from".to_string(), self.from.format("%Y-%m-%d").to_string()),
            ("to".to_string(), self.to.format("%Y-%m-%d").to_string()),
        ];
        pairs.extend(self.extra.iter().cloned());
        pairs
    }
}

/// One day of extended statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsEntry {
    pub date: NaiveDate,
    /// Every other field of the entry (counts, rates).
    pub fields: Payload,
}

impl StatsEntry {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// Extended statistics with each `data[i].date` parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedStats {
    pub status: u16,
    /// The payload without its `data` list.
    pub payload: Payload,
    pub data: Vec<StatsEntry>,
}

impl ExtendedStats {
    /// Split `data` out of `response` and parse every entry's date in order.
    ///
    /// The first malformed entry fails the whole conversion. A payload
    /// without `data` (for example a `fail` reply) yields no entries.
    pub fn from_response(response: ServiceResponse) -> Result<Self> {
        let ServiceResponse {
            status,
            mut payload,
        } = response;

        let raw = match payload.remove("data") {
            Some(Value::Array(entries)) => entries,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                return Err(ApiError::DeserializationError(format!(
                    "expected extended stats data to be a list, found {other}"
                )))
            }
        };

        let mut data = Vec::with_capacity(raw.len());
        for (index, entry) in raw.into_iter().enumerate() {
            data.push(parse_entry(index, entry)?);
        }

        Ok(Self {
            status,
            payload,
            data,
        })
    }

    pub fn service_status(&self) -> Option<&str> {
        self.payload.get("status").and_then(Value::as_str)
    }
}

fn parse_entry(index: usize, entry: Value) -> Result<StatsEntry> {
    let mut fields = match entry {
        Value::Object(fields) => fields,
        other => {
            return Err(ApiError::InvalidDate {
                index,
                value: other.to_string(),
            })
        }
    };
    let date = match fields.remove("date") {
        Some(Value::String(raw)) => {
            parse_date(&raw).ok_or(ApiError::InvalidDate { index, value: raw })?
        }
        Some(other) => {
            return Err(ApiError::InvalidDate {
                index,
                value: other.to_string(),
            })
        }
        None => {
            return Err(ApiError::InvalidDate {
                index,
                value: String::new(),
            })
        }
    };
    Ok(StatsEntry { date, fields })
}

/// Accepts `YYYY-MM-DD`, with or without an RFC 3339 time part.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}
