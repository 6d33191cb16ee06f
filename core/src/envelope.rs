//! Response envelope normalization.
//!
//! Every Defensio reply nests its payload under one top-level key,
//! `defensio-result`. This module strips that wrapper so callers deal with the
//! payload only.

use serde_json::{Map, Value};

use crate::error::{ApiError, Result};
use crate::http::HttpResponse;
use crate::path::Format;

/// Top-level key of every service reply.
pub const ROOT_NODE: &str = "defensio-result";

pub const STATUS_SUCCESS: &str = "success";

/// The unwrapped contents of an envelope.
pub type Payload = Map<String, Value>;

/// Parse `raw` in `format` and return the object under `ROOT_NODE`.
pub fn parse_body(format: Format, raw: &str) -> Result<Payload> {
    format.ensure_supported()?;
    let mut document: Value =
        serde_json::from_str(raw).map_err(|e| ApiError::DeserializationError(e.to_string()))?;
    match document.get_mut(ROOT_NODE).map(Value::take) {
        Some(Value::Object(payload)) => Ok(payload),
        Some(other) => Err(ApiError::DeserializationError(format!(
            "expected an object under {ROOT_NODE:?}, found {other}"
        ))),
        None => Err(ApiError::DeserializationError(format!(
            "missing {ROOT_NODE:?} envelope"
        ))),
    }
}

/// HTTP status plus unwrapped payload of one service call.
///
/// A `status` of `"fail"` inside the payload is a normal outcome and is left
/// for the caller to inspect.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceResponse {
    pub status: u16,
    pub payload: Payload,
}

impl ServiceResponse {
    /// The payload's `status` field, if present.
    pub fn service_status(&self) -> Option<&str> {
        self.payload.get("status").and_then(Value::as_str)
    }

    pub fn is_success(&self) -> bool {
        self.service_status() == Some(STATUS_SUCCESS)
    }

    /// The payload's `message` field, if present and non-null.
    pub fn message(&self) -> Option<&str> {
        self.payload.get("message").and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.payload.get(field)
    }

    pub fn into_parts(self) -> (u16, Payload) {
        (self.status, self.payload)
    }
}

/// Turn a raw response into a `ServiceResponse`.
///
/// A 2xx reply must carry a valid envelope. Any other status is passed back
/// as-is; if its body is not an envelope the payload is empty.
pub fn respond(format: Format, response: &HttpResponse) -> Result<ServiceResponse> {
    match parse_body(format, &response.body) {
        Ok(payload) => Ok(ServiceResponse {
            status: response.status,
            payload,
        }),
        Err(ApiError::DeserializationError(_)) if !response.is_success() => Ok(ServiceResponse {
            status: response.status,
            payload: Payload::new(),
        }),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn parse_body_unwraps_root_node() {
        let payload = parse_body(Format::Json, r#"{"defensio-result":{"hello":"world"}}"#).unwrap();
        let expected = json!({"hello": "world"});
        assert_eq!(Value::Object(payload), expected);
    }

    #[test]
    fn parse_body_rejects_xml() {
        let err = parse_body(Format::Xml, "<defensio-result/>").unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedFormat(Format::Xml)));
    }

    #[test]
    fn parse_body_requires_envelope() {
        let err = parse_body(Format::Json, r#"{"hello":"world"}"#).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn parse_body_requires_object_payload() {
        let err = parse_body(Format::Json, r#"{"defensio-result":[1,2]}"#).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn parse_body_rejects_garbage() {
        let err = parse_body(Format::Json, "not json").unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn respond_keeps_service_failure_as_data() {
        let resp = respond(
            Format::Json,
            &response(
                401,
                r#"{"defensio-result":{"status":"fail","message":"API key not found"}}"#,
            ),
        )
        .unwrap();
        assert_eq!(resp.status, 401);
        assert!(!resp.is_success());
        assert_eq!(resp.service_status(), Some("fail"));
        assert_eq!(resp.message(), Some("API key not found"));
    }

    #[test]
    fn respond_tolerates_non_envelope_error_bodies() {
        let resp = respond(Format::Json, &response(502, "<html>bad gateway</html>")).unwrap();
        assert_eq!(resp.status, 502);
        assert!(resp.payload.is_empty());
    }

    #[test]
    fn respond_rejects_malformed_success_body() {
        let err = respond(Format::Json, &response(200, "oops")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn into_parts_yields_status_and_payload() {
        let resp = respond(
            Format::Json,
            &response(200, r#"{"defensio-result":{"status":"success"}}"#),
        )
        .unwrap();
        let (status, payload) = resp.into_parts();
        assert_eq!(status, 200);
        assert_eq!(payload["status"], "success");
    }
}
