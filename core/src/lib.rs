//! Synchronous client for the Defensio content-moderation API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). A `Transport` executes the
//! round-trip; `DefensioClient` pairs the two for one-call-per-operation use.
//!
//! # Design
//! - The API key lives in a `Config` owned by each client, never in globals.
//! - Every call is split into `build_*` (produces a request) and `parse_*`
//!   (consumes the response), so the I/O boundary is explicit.
//! - Replies are unwrapped from the `defensio-result` envelope and returned as
//!   status code plus payload map. A rejected document is data; a missing key,
//!   content or signature is an `ApiError`.
//! - `Document` is the per-document handle and the only mutable state: the
//!   signature the service issued for it.
//!
//! ```no_run
//! use defensio_core::{Config, DefensioClient};
//!
//! let client = DefensioClient::with_ureq(Config::from_env());
//! let docs = client.documents();
//! let mut doc = docs.new_document([("content", "Buy cheap watches"), ("type", "comment")])?;
//! let reply = docs.post(&mut doc)?;
//! if reply.is_success() {
//!     println!("signature {:?}, allow {:?}", doc.signature(), reply.get("allow"));
//! }
//! # Ok::<(), defensio_core::ApiError>(())
//! ```

pub mod account;
pub mod callback;
pub mod client;
pub mod config;
pub mod document;
pub mod envelope;
pub mod error;
pub mod http;
pub mod path;
pub mod transport;
pub mod types;

pub use callback::{handle_async_callback, CallbackInput};
pub use client::{Account, DefensioClient, Documents};
pub use config::Config;
pub use document::Document;
pub use envelope::{parse_body, Payload, ServiceResponse, ROOT_NODE};
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use path::{api_path, Format, API_VERSION};
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{DocumentOptions, ExtendedStats, ExtendedStatsQuery, StatsEntry, ALLOWED_OPTIONS};
