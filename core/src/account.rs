//! Account-level requests: user info, statistics and the profanity filter.
//!
//! None of these need a document handle; they depend on the `Config` alone.
//! Each call is a `build_*` function producing an `HttpRequest` and, where the
//! reply needs reshaping, a `parse_*` function consuming the `HttpResponse`.

use crate::config::Config;
use crate::envelope::{respond, ServiceResponse};
use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::path::{api_path, ACTION_BASIC_STATS, ACTION_EXTENDED_STATS, ACTION_PROFANITY_FILTER};
use crate::types::{ExtendedStats, ExtendedStatsQuery};

pub(crate) fn request(
    config: &Config,
    method: HttpMethod,
    action: Option<&str>,
    id: Option<&str>,
) -> Result<HttpRequest> {
    let path = api_path(config, action, id)?;
    tracing::debug!(method = method.as_str(), path = %config.redact(&path), "building request");
    Ok(HttpRequest::new(
        method,
        format!("{}{path}", config.base_url),
        &config.user_agent,
    ))
}

pub fn build_get_user(config: &Config) -> Result<HttpRequest> {
    request(config, HttpMethod::Get, None, None)
}

pub fn build_get_basic_stats(config: &Config) -> Result<HttpRequest> {
    request(config, HttpMethod::Get, Some(ACTION_BASIC_STATS), None)
}

pub fn build_get_extended_stats(config: &Config, query: &ExtendedStatsQuery) -> Result<HttpRequest> {
    Ok(request(config, HttpMethod::Get, Some(ACTION_EXTENDED_STATS), None)?.with_query(query.to_pairs()))
}

/// POST arbitrary `fields` to be filtered; the reply echoes them under `filtered`.
pub fn build_post_profanity_filter<I, K, V>(config: &Config, fields: I) -> Result<HttpRequest>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let fields: Vec<(String, String)> = fields
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    request(config, HttpMethod::Post, Some(ACTION_PROFANITY_FILTER), None)?.with_form(&fields)
}

/// Unwrap a user, basic-stats or profanity-filter reply.
pub fn parse_response(config: &Config, response: &HttpResponse) -> Result<ServiceResponse> {
    respond(config.format, response)
}

pub fn parse_extended_stats(config: &Config, response: &HttpResponse) -> Result<ExtendedStats> {
    ExtendedStats::from_response(respond(config.format, response)?)
}
