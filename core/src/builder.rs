//! The mutable, single-use aggregate of a request's configurable fields.
//!
//! # Design
//! A `RequestBuilder` is created fresh for every call and owned by it. Options
//! receive `&mut RequestBuilder` one after another, so exclusive access is
//! enforced by the borrow checker instead of a lock.

use std::collections::BTreeMap;

use ureq::http;
use url::Url;

use crate::error::Error;
use crate::http::{HttpMethod, HttpRequest, RequestBody, DEFAULT_ACCEPT};
use crate::transport::Transport;

#[derive(Debug)]
pub struct RequestBuilder {
    pub(crate) url: Option<String>,
    pub(crate) method: HttpMethod,
    pub(crate) content_type: Option<String>,
    pub(crate) accept: Option<String>,
    pub(crate) query_params: BTreeMap<String, String>,
    pub(crate) body: RequestBody,
    pub(crate) allowed_status_codes: Vec<u16>,
    pub(crate) transport: Option<Transport>,
}

impl RequestBuilder {
    pub(crate) fn new() -> Self {
        Self {
            url: None,
            method: HttpMethod::Get,
            content_type: None,
            accept: None,
            query_params: BTreeMap::new(),
            body: RequestBody::empty(),
            allowed_status_codes: Vec::new(),
            transport: None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// The `Accept` value. Filled with `DEFAULT_ACCEPT` once materialized.
    pub fn accept(&self) -> Option<&str> {
        self.accept.as_deref()
    }

    pub fn query_params(&self) -> &BTreeMap<String, String> {
        &self.query_params
    }

    /// Whether a body is still attached. Materializing moves it into the request.
    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }

    /// Acceptable response statuses. Empty accepts any status.
    pub fn allowed_status_codes(&self) -> &[u16] {
        &self.allowed_status_codes
    }

    /// The transport handle. A default one is created at materialization
    /// when no option supplied one.
    pub fn transport(&self) -> Option<&Transport> {
        self.transport.as_ref()
    }

    pub(crate) fn is_allowed(&self, status: u16) -> bool {
        self.allowed_status_codes.is_empty() || self.allowed_status_codes.contains(&status)
    }

    /// Turn the configured fields into a transport-ready request.
    ///
    /// Any query string embedded in the URL is replaced by the encoded
    /// `query_params`, keys in sorted order. Without a URL the request keeps
    /// the default `/` target and will fail once sent.
    pub(crate) fn materialize(&mut self) -> Result<HttpRequest, Error> {
        let accept = self
            .accept
            .get_or_insert_with(|| DEFAULT_ACCEPT.to_string())
            .clone();
        self.transport.get_or_insert_with(Transport::default);

        let mut request = http::Request::builder().method(http::Method::from(self.method));
        if let Some(raw) = &self.url {
            let mut url = Url::parse(raw)?;
            url.set_query(None);
            if !self.query_params.is_empty() {
                url.query_pairs_mut().extend_pairs(&self.query_params);
            }
            request = request.uri(url.as_str());
        }
        if let Some(content_type) = &self.content_type {
            request = request.header(http::header::CONTENT_TYPE, content_type.as_str());
        }
        request = request.header(http::header::ACCEPT, accept);

        Ok(request.body(std::mem::take(&mut self.body))?)
    }
}
