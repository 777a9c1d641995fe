//! Transport handle that performs the actual network round trip.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use ureq::http;
use ureq::{Agent, SendBody};
use url::Url;

use crate::error::Error;
use crate::http::{HttpRequest, RequestBody};

/// Transport configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Upper bound on each call, including reading the body. `None` waits forever.
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    /// Redirects followed before giving up with `Error::TooManyRedirects`.
    /// Zero disables redirects and returns the 3xx response.
    pub max_redirects: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: None,
            max_redirects: 10,
        }
    }
}

/// Shareable handle to a configured HTTP agent.
///
/// Cloning is cheap and clones share the same connection pool, so one
/// transport can serve many requests across threads.
///
/// Redirects are followed here rather than inside the agent: a 3xx that
/// cannot be followed (no `Location`, or a 307/308 whose streamed body is
/// already spent) is handed back as a response for the allow-list to judge.
#[derive(Clone)]
pub struct Transport {
    agent: Agent,
    config: TransportConfig,
}

impl Transport {
    pub fn new() -> Self {
        Self::with_config(TransportConfig::default())
    }

    pub fn with_config(config: TransportConfig) -> Self {
        // Status codes are policy for the caller's allow-list, not transport errors.
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .timeout_connect(config.connect_timeout)
            .max_redirects(0)
            .max_redirects_will_error(false)
            .build()
            .new_agent();
        Self { agent, config }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Send `request` and return the raw response with its body unread.
    ///
    /// The request body is streamed, never buffered.
    pub fn execute(&self, request: HttpRequest) -> Result<http::Response<ureq::Body>, Error> {
        let (parts, body) = request.into_parts();
        let mut method = parts.method;
        let mut uri = parts.uri;
        let mut headers = parts.headers;
        let mut body = (!body.is_empty()).then_some(body);
        let mut redirects = 0;

        loop {
            let response = self.round_trip(&method, &uri, &headers, body.as_mut())?;
            let status = response.status();
            let Some(location) = redirect_location(&response) else {
                return Ok(response);
            };
            let keeps_method = matches!(
                status,
                http::StatusCode::TEMPORARY_REDIRECT | http::StatusCode::PERMANENT_REDIRECT
            );
            if (keeps_method && body.is_some()) || self.config.max_redirects == 0 {
                return Ok(response);
            }
            if redirects >= self.config.max_redirects {
                return Err(Error::TooManyRedirects(self.config.max_redirects));
            }
            redirects += 1;

            uri = resolve_location(&uri, &location)?;
            if !keeps_method && method != http::Method::HEAD {
                method = http::Method::GET;
                body = None;
                headers.remove(http::header::CONTENT_TYPE);
                headers.remove(http::header::CONTENT_LENGTH);
            }
            tracing::debug!(%status, %uri, redirects, "following redirect");
        }
    }

    fn round_trip(
        &self,
        method: &http::Method,
        uri: &http::Uri,
        headers: &http::HeaderMap,
        body: Option<&mut RequestBody>,
    ) -> Result<http::Response<ureq::Body>, Error> {
        let mut request = http::Request::builder().method(method.clone()).uri(uri.clone());
        if let Some(map) = request.headers_mut() {
            map.extend(headers.clone());
        }
        let response = match body {
            Some(body) => self.agent.run(request.body(SendBody::from_reader(body))?)?,
            None => self.agent.run(request.body(())?)?,
        };
        Ok(response)
    }
}

/// Target of a followable redirect, if `response` is one.
fn redirect_location<B>(response: &http::Response<B>) -> Option<String> {
    match response.status() {
        http::StatusCode::MOVED_PERMANENTLY
        | http::StatusCode::FOUND
        | http::StatusCode::SEE_OTHER
        | http::StatusCode::TEMPORARY_REDIRECT
        | http::StatusCode::PERMANENT_REDIRECT => response
            .headers()
            .get(http::header::LOCATION)?
            .to_str()
            .ok()
            .map(str::to_string),
        _ => None,
    }
}

fn resolve_location(base: &http::Uri, location: &str) -> Result<http::Uri, Error> {
    let next = Url::parse(&base.to_string())?.join(location)?;
    next.as_str()
        .parse::<http::Uri>()
        .map_err(|e| Error::Request(e.into()))
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport").field("config", &self.config).finish()
    }
}
