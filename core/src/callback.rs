//! Inbound callbacks posted by the service once an asynchronous document
//! analysis completes.
//!
//! The body of such a callback is an ordinary envelope. `CallbackInput` lets
//! the caller hand it over either as text already in memory or as the body
//! stream of whatever web framework received it.

use std::fmt;
use std::io::Read;

use crate::envelope::{parse_body, Payload};
use crate::error::{ApiError, Result};
use crate::path::Format;

pub enum CallbackInput<'a> {
    Text(String),
    Bytes(Vec<u8>),
    Reader(Box<dyn Read + 'a>),
}

impl<'a> CallbackInput<'a> {
    pub fn reader(body: impl Read + 'a) -> Self {
        CallbackInput::Reader(Box::new(body))
    }

    /// Read the whole body as UTF-8 text.
    pub fn into_text(self) -> Result<String> {
        match self {
            CallbackInput::Text(text) => Ok(text),
            CallbackInput::Bytes(bytes) => {
                String::from_utf8(bytes).map_err(|e| ApiError::InvalidInput(e.to_string()))
            }
            CallbackInput::Reader(mut body) => {
                let mut text = String::new();
                body.read_to_string(&mut text)
                    .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
                Ok(text)
            }
        }
    }
}

impl fmt::Debug for CallbackInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackInput::Text(text) => f.debug_tuple("Text").field(text).finish(),
            CallbackInput::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            CallbackInput::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

impl From<String> for CallbackInput<'_> {
    fn from(text: String) -> Self {
        CallbackInput::Text(text)
    }
}

impl From<&str> for CallbackInput<'_> {
    fn from(text: &str) -> Self {
        CallbackInput::Text(text.to_string())
    }
}

impl From<Vec<u8>> for CallbackInput<'_> {
    fn from(bytes: Vec<u8>) -> Self {
        CallbackInput::Bytes(bytes)
    }
}

impl From<&[u8]> for CallbackInput<'_> {
    fn from(bytes: &[u8]) -> Self {
        CallbackInput::Bytes(bytes.to_vec())
    }
}

/// Read a callback body and return the document status it carries.
pub fn handle_async_callback<'a>(format: Format, input: impl Into<CallbackInput<'a>>) -> Result<Payload> {
    let body = input.into().into_text()?;
    parse_body(format, &body)
}
