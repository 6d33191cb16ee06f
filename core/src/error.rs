//! Error types for the Defensio client.
//!
//! # Design
//! Only conditions the caller caused get a variant: a missing credential,
//! content or signature, input that cannot be read, or a format the client
//! cannot speak. A document rejected by the service, or a non-2xx status, is
//! an expected outcome and travels back as data inside `ServiceResponse`.

use thiserror::Error;

use crate::path::Format;

/// Errors returned by the Defensio client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No API key is configured.
    #[error("no API key configured")]
    MissingApiKey,

    /// A document was posted without any `content`.
    #[error("document has no content")]
    MissingContent,

    /// A document operation needs a signature and none could be resolved.
    #[error("document has no signature")]
    MissingSignature,

    /// A callback body could not be read as text.
    #[error("invalid callback input: {0}")]
    InvalidInput(String),

    /// The configured serialization format is not implemented.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(Format),

    /// An extended-stats entry carried a date that could not be parsed.
    #[error("invalid date {value:?} in extended stats entry {index}")]
    InvalidDate { index: usize, value: String },

    /// The request parameters could not be encoded.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// A successful response body was not a valid envelope.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The transport failed before a response was received.
    #[error("transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;
