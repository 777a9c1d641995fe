//! HTTP data types shared by the builder, the transport and callers.
//!
//! # Design
//! The materialized request is a plain `http::Request` so callers that use
//! `build_request` can inspect or tweak it before handing it to `execute`.
//! Request bodies stay a stream until the transport sends them. Responses
//! are normalized into an owned `Response` with the full body already read
//! into memory.

use std::fmt;
use std::io::{self, Read};

use serde::de::DeserializeOwned;
use ureq::http;

use crate::error::Error;

/// Media type used by the `json()` option.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Media type used by the `xml()` option.
pub const CONTENT_TYPE_XML: &str = "application/xml";

/// `Accept` value sent when no option sets one.
pub const DEFAULT_ACCEPT: &str = CONTENT_TYPE_JSON;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for http::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Delete => http::Method::DELETE,
            HttpMethod::Head => http::Method::HEAD,
        }
    }
}

/// Outgoing request body: an owned byte stream, or nothing.
#[derive(Default)]
pub struct RequestBody(Option<Box<dyn Read + Send>>);

impl RequestBody {
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn from_reader(reader: impl Read + Send + 'static) -> Self {
        Self(Some(Box::new(reader)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

impl Read for RequestBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.0 {
            Some(reader) => reader.read(buf),
            None => Ok(0),
        }
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("RequestBody(<stream>)"),
            None => f.write_str("RequestBody(empty)"),
        }
    }
}

/// A materialized, transport-ready request.
pub type HttpRequest = http::Request<RequestBody>;

/// A completed HTTP exchange with the body fully read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    /// First value of header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}
