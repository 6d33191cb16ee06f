//! Blocking client that pairs the request builders with a `Transport`.
//!
//! # Design
//! `DefensioClient` owns the `Config` and the transport and exposes the API in
//! two groups: `account()` for calls that need only the credential, and
//! `documents()` for calls driven by a `Document` handle. Each call is one
//! `build_*`, one `Transport::execute`, one `parse_*`.

use crate::account;
use crate::callback::{handle_async_callback, CallbackInput};
use crate::config::Config;
use crate::document::Document;
use crate::envelope::{Payload, ServiceResponse};
use crate::error::Result;
use crate::transport::Transport;
use crate::types::{ExtendedStats, ExtendedStatsQuery};

#[derive(Debug, Clone)]
pub struct DefensioClient<T> {
    config: Config,
    transport: T,
}

#[cfg(feature = "ureq")]
impl DefensioClient<crate::transport::UreqTransport> {
    /// A client using the default `ureq` transport.
    pub fn with_ureq(config: Config) -> Self {
        Self::new(config, crate::transport::UreqTransport::new())
    }
}

impl<T: Transport> DefensioClient<T> {
    pub fn new(config: Config, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn account(&self) -> Account<'_, T> {
        Account { client: self }
    }

    pub fn documents(&self) -> Documents<'_, T> {
        Documents { client: self }
    }

    /// Parse a callback the service posted after analysing a document.
    pub fn handle_async_callback<'a>(&self, input: impl Into<CallbackInput<'a>>) -> Result<Payload> {
        handle_async_callback(self.config.format, input)
    }
}

/// Calls scoped to the account behind the API key.
#[derive(Debug)]
pub struct Account<'a, T> {
    client: &'a DefensioClient<T>,
}

// Manual impls: the group only borrows the client, so `T` needs no bounds.
impl<T> Clone for Account<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Account<'_, T> {}

impl<T: Transport> Account<'_, T> {
    pub fn user(&self) -> Result<ServiceResponse> {
        let config = &self.client.config;
        let response = self.client.transport.execute(account::build_get_user(config)?)?;
        account::parse_response(config, &response)
    }

    pub fn basic_stats(&self) -> Result<ServiceResponse> {
        let config = &self.client.config;
        let response = self
            .client
            .transport
            .execute(account::build_get_basic_stats(config)?)?;
        account::parse_response(config, &response)
    }

    pub fn extended_stats(&self, query: &ExtendedStatsQuery) -> Result<ExtendedStats> {
        let config = &self.client.config;
        let response = self
            .client
            .transport
            .execute(account::build_get_extended_stats(config, query)?)?;
        account::parse_extended_stats(config, &response)
    }

    pub fn profanity_filter<I, K, V>(&self, fields: I) -> Result<ServiceResponse>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let config = &self.client.config;
        let response = self
            .client
            .transport
            .execute(account::build_post_profanity_filter(config, fields)?)?;
        account::parse_response(config, &response)
    }
}

/// Calls driven by a `Document` handle.
#[derive(Debug)]
pub struct Documents<'a, T> {
    client: &'a DefensioClient<T>,
}

impl<T> Clone for Documents<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Documents<'_, T> {}

impl<T: Transport> Documents<'_, T> {
    /// Create a handle bound to this client's credential.
    pub fn new_document<I, K, V>(&self, options: I) -> Result<Document>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Document::new(&self.client.config, options)
    }

    pub fn post(&self, document: &mut Document) -> Result<ServiceResponse> {
        let config = &self.client.config;
        let response = self.client.transport.execute(document.build_post(config)?)?;
        document.parse_post(config, &response)
    }

    pub fn get(&self, document: &mut Document, signature: Option<&str>) -> Result<ServiceResponse> {
        let config = &self.client.config;
        let response = self
            .client
            .transport
            .execute(document.build_get(config, signature)?)?;
        document.parse_response(config, &response)
    }

    pub fn put<I, K, V>(
        &self,
        document: &mut Document,
        signature: Option<&str>,
        data: I,
    ) -> Result<ServiceResponse>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let config = &self.client.config;
        let response = self
            .client
            .transport
            .execute(document.build_put(config, signature, data)?)?;
        document.parse_response(config, &response)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::NaiveDate;

    use super::*;
    use crate::error::ApiError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Records every request and answers each with the next canned body.
    struct Scripted {
        seen: RefCell<Vec<HttpRequest>>,
        replies: RefCell<Vec<(u16, &'static str)>>,
    }

    impl Scripted {
        fn new(replies: Vec<(u16, &'static str)>) -> Self {
            Self {
                seen: RefCell::new(Vec::new()),
                replies: RefCell::new(replies.into_iter().rev().collect()),
            }
        }
    }

    impl Transport for Scripted {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.seen.borrow_mut().push(request);
            let (status, body) = self
                .replies
                .borrow_mut()
                .pop()
                .ok_or_else(|| ApiError::Transport("no scripted reply left".to_string()))?;
            Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            })
        }
    }

    fn client(replies: Vec<(u16, &'static str)>) -> DefensioClient<Scripted> {
        DefensioClient::new(
            Config::new("KEY").with_base_url("http://svc"),
            Scripted::new(replies),
        )
    }

    #[test]
    fn account_calls_hit_account_paths() {
        let client = client(vec![
            (200, r#"{"defensio-result":{"status":"success","owner-url":"http://x"}}"#),
            (200, r#"{"defensio-result":{"status":"success","unwanted":{"total":1}}}"#),
        ]);
        assert!(client.account().user().unwrap().is_success());
        let stats = client.account().basic_stats().unwrap();
        assert_eq!(stats.payload["unwanted"]["total"], 1);

        let seen = client.transport.seen.borrow();
        assert_eq!(seen[0].path, "http://svc/2.0/users/KEY.json");
        assert_eq!(seen[1].path, "http://svc/2.0/users/KEY/basic-stats.json");
    }

    #[test]
    fn groups_are_copy_over_non_clone_transport() {
        let client = client(vec![
            (200, r#"{"defensio-result":{"status":"success"}}"#),
            (200, r#"{"defensio-result":{"status":"success"}}"#),
        ]);
        let account = client.account();
        let copied = account;
        assert!(account.user().unwrap().is_success());
        assert!(copied.basic_stats().unwrap().is_success());

        let docs = client.documents();
        let also_docs = docs;
        let mut doc = docs.new_document([("content", "hi")]).unwrap();
        assert!(matches!(
            also_docs.get(&mut doc, None),
            Err(ApiError::MissingSignature)
        ));
        assert_eq!(client.transport.seen.borrow().len(), 2);
    }

    #[test]
    fn extended_stats_returns_parsed_dates() {
        let client = client(vec![(
            200,
            r#"{"defensio-result":{"status":"success","data":[{"date":"2009-09-01"},{"date":"2009-09-02"}]}}"#,
        )]);
        let query = ExtendedStatsQuery::new(
            NaiveDate::from_ymd_opt(2009, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2009, 9, 2).unwrap(),
        );
        let stats = client.account().extended_stats(&query).unwrap();
        assert_eq!(stats.data.len(), 2);
        assert_eq!(stats.data[1].date, NaiveDate::from_ymd_opt(2009, 9, 2).unwrap());
        assert_eq!(client.transport.seen.borrow()[0].query.len(), 2);
    }

    #[test]
    fn missing_content_never_reaches_transport() {
        let client = client(Vec::new());
        let mut doc = client.documents().new_document([("type", "comment")]).unwrap();
        assert!(matches!(
            client.documents().post(&mut doc),
            Err(ApiError::MissingContent)
        ));
        assert!(client.transport.seen.borrow().is_empty());
    }

    #[test]
    fn missing_signature_never_reaches_transport() {
        let client = client(Vec::new());
        let mut doc = client.documents().new_document([("content", "hi")]).unwrap();
        assert!(matches!(
            client.documents().get(&mut doc, None),
            Err(ApiError::MissingSignature)
        ));
        assert!(client.transport.seen.borrow().is_empty());
    }

    #[test]
    fn post_then_get_then_put_uses_issued_signature() {
        let client = client(vec![
            (200, r#"{"defensio-result":{"status":"success","signature":"abc","allow":true}}"#),
            (200, r#"{"defensio-result":{"status":"success","signature":"abc","allow":true}}"#),
            (200, r#"{"defensio-result":{"status":"success","signature":"abc","allow":false}}"#),
        ]);
        let docs = client.documents();
        let mut doc = docs.new_document([("content", "hello"), ("type", "comment")]).unwrap();

        let posted = docs.post(&mut doc).unwrap();
        assert_eq!(doc.signature(), posted.get("signature").and_then(|v| v.as_str()));

        docs.get(&mut doc, None).unwrap();
        let updated = docs.put(&mut doc, None, [("allow", "false")]).unwrap();
        assert_eq!(updated.payload["allow"], false);

        let seen = client.transport.seen.borrow();
        assert_eq!(seen[0].method, HttpMethod::Post);
        assert_eq!(seen[1].path, "http://svc/2.0/users/KEY/documents/abc.json");
        assert_eq!(seen[2].method, HttpMethod::Put);
        assert_eq!(seen[2].path, "http://svc/2.0/users/KEY/documents/abc.json");
    }

    #[test]
    fn rejected_post_is_data() {
        let client = client(vec![(
            401,
            r#"{"defensio-result":{"status":"fail","message":"API key not found"}}"#,
        )]);
        let mut doc = client.documents().new_document([("content", "hello")]).unwrap();
        let reply = client.documents().post(&mut doc).unwrap();
        assert_eq!(reply.status, 401);
        assert_eq!(reply.service_status(), Some("fail"));
        assert!(doc.signature().is_none());
    }

    #[test]
    fn transport_errors_propagate() {
        let failing = |_: HttpRequest| -> Result<HttpResponse> {
            Err(ApiError::Transport("connection refused".to_string()))
        };
        let client = DefensioClient::new(Config::new("KEY"), failing);
        match client.account().user() {
            Err(ApiError::Transport(msg)) => assert_eq!(msg, "connection refused"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn callback_uses_client_format() {
        let client = client(Vec::new());
        let payload = client
            .handle_async_callback(r#"{"defensio-result":{"status":"success"}}"#)
            .unwrap();
        assert_eq!(payload["status"], "success");
    }
}
