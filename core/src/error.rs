//! Error types for request composition and execution.
//!
//! # Design
//! Every failure surfaces as an `Error` with no response attached, except a
//! disallowed status code. That case is reported through `Outcome::Rejected`,
//! which carries the received `Response` next to the `InvalidStatusCode`
//! sentinel. `Error::InvalidStatusCode` only appears once a caller collapses
//! an outcome with `Outcome::into_result`.

use std::io;

/// Boxed error produced by a caller-supplied option.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Sentinel returned when a response status is not in the allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid status code: {status}")]
pub struct InvalidStatusCode {
    pub status: u16,
}

/// Errors returned while building, sending or decoding a request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An option reported failure while being applied to the builder.
    #[error("request option failed: {0}")]
    Option(#[source] BoxError),

    /// The target URL is not a valid absolute URL.
    #[error("invalid url: {0}")]
    UrlParse(#[from] url::ParseError),

    /// The transport request could not be assembled from method, URL and headers.
    #[error("failed to build request: {0}")]
    Request(#[from] ureq::http::Error),

    /// The round trip itself failed (DNS, connect, TLS, timeout, I/O,
    /// or the request body stream erroring while being sent).
    #[error("request failed: {0}")]
    Transport(#[from] ureq::Error),

    #[error("stopped after {0} redirects")]
    TooManyRedirects(u32),

    /// The response arrived but its body could not be read into memory.
    #[error("failed to read response body: {0}")]
    BodyRead(#[source] io::Error),

    #[error(transparent)]
    InvalidStatusCode(#[from] InvalidStatusCode),

    /// The response body is not valid JSON for the requested type.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// Wrap a failure raised inside a custom `RequestOption`.
    pub fn option(err: impl Into<BoxError>) -> Self {
        Error::Option(err.into())
    }
}
