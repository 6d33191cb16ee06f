//! Client-side handle for one document submitted for analysis.
//!
//! # Design
//! A `Document` owns its whitelisted options and the signature the service
//! issued for it. The signature starts out as the `signature` option, if one
//! was given, and is replaced by each successful post. Operations that mutate
//! it take `&mut self`, so a handle cannot be driven from two places at once.

use crate::account::request;
use crate::config::{Config, CLIENT_ID};
use crate::envelope::{respond, ServiceResponse};
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::path::ACTION_DOCUMENTS;
use crate::types::DocumentOptions;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    options: DocumentOptions,
    signature: Option<String>,
}

impl Document {
    /// Create a handle from `options`, dropping keys outside `ALLOWED_OPTIONS`.
    ///
    /// Fails with `ApiError::MissingApiKey` when `config` has no key, whatever
    /// the options are.
    pub fn new<I, K, V>(config: &Config, options: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        config.check_key()?;
        let options = DocumentOptions::filter(options);
        let signature = options
            .get("signature")
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Ok(Self { options, signature })
    }

    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn content(&self) -> Option<&str> {
        self.options.content()
    }

    /// Build the request creating this document on the service.
    pub fn build_post(&self, config: &Config) -> Result<HttpRequest> {
        if self.content().map_or(true, str::is_empty) {
            return Err(ApiError::MissingContent);
        }
        let mut fields = vec![("client".to_string(), CLIENT_ID.to_string())];
        fields.extend(self.options.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        request(config, HttpMethod::Post, Some(ACTION_DOCUMENTS), None)?.with_form(&fields)
    }

    /// Unwrap a post reply and adopt its signature when the service accepted
    /// the document.
    pub fn parse_post(&mut self, config: &Config, response: &HttpResponse) -> Result<ServiceResponse> {
        let reply = respond(config.format, response)?;
        if reply.is_success() {
            if let Some(signature) = reply
                .get("signature")
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
            {
                self.signature = Some(signature.to_string());
            }
        } else {
            tracing::warn!(
                status = reply.status,
                service_status = reply.service_status().unwrap_or("missing"),
                message = reply.message().unwrap_or(""),
                "document post was not accepted"
            );
        }
        Ok(reply)
    }

    /// Build the request fetching this document's current status.
    ///
    /// Uses the stored signature, falling back to `signature` (which is then
    /// stored).
    pub fn build_get(&mut self, config: &Config, signature: Option<&str>) -> Result<HttpRequest> {
        let signature = self.resolve_signature(signature)?;
        request(config, HttpMethod::Get, Some(ACTION_DOCUMENTS), Some(&signature))
    }

    /// Build the request updating this document with arbitrary `data`.
    ///
    /// `data` bypasses the option whitelist, so fields such as `allow` can be
    /// sent. Signature resolution is the same as for `build_get`.
    pub fn build_put<I, K, V>(
        &mut self,
        config: &Config,
        signature: Option<&str>,
        data: I,
    ) -> Result<HttpRequest>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let signature = self.resolve_signature(signature)?;
        let fields: Vec<(String, String)> = data
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        request(config, HttpMethod::Put, Some(ACTION_DOCUMENTS), Some(&signature))?.with_form(&fields)
    }

    /// Unwrap a get or put reply. The stored signature is not touched.
    pub fn parse_response(&self, config: &Config, response: &HttpResponse) -> Result<ServiceResponse> {
        respond(config.format, response)
    }

    fn resolve_signature(&mut self, fallback: Option<&str>) -> Result<String> {
        if self.signature.is_none() {
            self.signature = fallback.filter(|s| !s.is_empty()).map(str::to_string);
        }
        self.signature.clone().ok_or(ApiError::MissingSignature)
    }
}
