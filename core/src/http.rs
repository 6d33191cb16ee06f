//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. The request builders produce an
//! `HttpRequest`; whoever executes it (a `Transport`, or the caller directly)
//! hands back an `HttpResponse` for parsing. Bodies are already encoded, so a
//! transport only has to copy bytes onto the wire.

use crate::error::{ApiError, Result};

pub const CONTENT_TYPE: &str = "content-type";
pub const USER_AGENT: &str = "user-agent";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `path` is absolute (base URL included). `query` pairs are not yet encoded;
/// `url()` renders them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub(crate) fn new(method: HttpMethod, path: String, user_agent: &str) -> Self {
        Self {
            method,
            path,
            query: Vec::new(),
            headers: vec![(USER_AGENT.to_string(), user_agent.to_string())],
            body: None,
        }
    }

    pub(crate) fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// Attach `fields` as an `application/x-www-form-urlencoded` body.
    pub(crate) fn with_form(mut self, fields: &[(String, String)]) -> Result<Self> {
        let body = serde_urlencoded::to_string(fields)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        self.headers
            .push((CONTENT_TYPE.to_string(), FORM_CONTENT_TYPE.to_string()));
        self.body = Some(body);
        Ok(self)
    }

    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The full URL including the encoded query string.
    pub fn url(&self) -> Result<String> {
        if self.query.is_empty() {
            return Ok(self.path.clone());
        }
        let query = serde_urlencoded::to_string(&self.query)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(format!("{}?{query}", self.path))
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, "http://host/2.0/users/k.json".to_string(), "ua/1")
    }

    #[test]
    fn new_request_carries_user_agent() {
        let req = request();
        assert_eq!(req.header("User-Agent"), Some("ua/1"));
        assert!(req.body.is_none());
        assert!(req.query.is_empty());
    }

    #[test]
    fn url_without_query_is_path() {
        assert_eq!(request().url().unwrap(), "http://host/2.0/users/k.json");
    }

    #[test]
    fn url_encodes_query_pairs() {
        let req = request().with_query(vec![
            ("from".to_string(), "2009-09-01".to_string()),
            ("tag".to_string(), "a b&c".to_string()),
        ]);
        assert_eq!(
            req.url().unwrap(),
            "http://host/2.0/users/k.json?from=2009-09-01&tag=a+b%26c"
        );
    }

    #[test]
    fn form_body_sets_content_type() {
        let req = request()
            .with_form(&[
                ("content".to_string(), "hello world".to_string()),
                ("author-email".to_string(), "a@b.c".to_string()),
            ])
            .unwrap();
        assert_eq!(req.header(CONTENT_TYPE), Some(FORM_CONTENT_TYPE));
        assert_eq!(
            req.body.as_deref(),
            Some("content=hello+world&author-email=a%40b.c")
        );
    }

    #[test]
    fn success_range() {
        let mut resp = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: String::new(),
        };
        assert!(resp.is_success());
        resp.status = 401;
        assert!(!resp.is_success());
    }

    #[test]
    fn method_names() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Post.as_str(), "POST");
        assert_eq!(HttpMethod::Put.as_str(), "PUT");
    }
}
