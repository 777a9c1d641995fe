//! Compose, send and validate requests.
//!
//! # Design
//! Every call builds its own `RequestBuilder`, applies the caller's options in
//! order, then the verb helper's own method and URL options last, so no caller
//! option can change which verb is sent or where. The request is then
//! materialized, sent once through the builder's transport, and the response
//! body is read fully into memory before the status allow-list is checked.

use std::io::Read;

use ureq::http;

use crate::builder::RequestBuilder;
use crate::error::{Error, InvalidStatusCode};
use crate::http::{HttpMethod, HttpRequest, Response};
use crate::options::{set_method, set_url, RequestOption};
use crate::transport::Transport;

/// Result of a completed round trip.
///
/// A response whose status is outside the allow-list is still returned, as
/// `Rejected`, so the caller can inspect what the server actually sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted(Response),
    Rejected {
        response: Response,
        error: InvalidStatusCode,
    },
}

impl Outcome {
    pub fn response(&self) -> &Response {
        match self {
            Outcome::Accepted(response) | Outcome::Rejected { response, .. } => response,
        }
    }

    pub fn into_response(self) -> Response {
        match self {
            Outcome::Accepted(response) | Outcome::Rejected { response, .. } => response,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted(_))
    }

    pub fn status_error(&self) -> Option<InvalidStatusCode> {
        match self {
            Outcome::Accepted(_) => None,
            Outcome::Rejected { error, .. } => Some(*error),
        }
    }

    /// Collapse into a plain result, dropping the response of a rejection.
    pub fn into_result(self) -> Result<Response, Error> {
        match self {
            Outcome::Accepted(response) => Ok(response),
            Outcome::Rejected { error, .. } => Err(error.into()),
        }
    }
}

/// Apply `options` to a fresh builder and materialize the request.
///
/// Stops at the first failing option; no request is built in that case.
pub fn build_request(options: Vec<RequestOption>) -> Result<(RequestBuilder, HttpRequest), Error> {
    let mut builder = RequestBuilder::new();
    tracing::trace!(options = options.len(), "applying request options");
    for option in options {
        option.apply(&mut builder)?;
    }
    let request = builder.materialize()?;
    tracing::debug!(method = %request.method(), uri = %request.uri(), "request built");
    Ok((builder, request))
}

/// Send a materialized request through `builder`'s transport and validate the status.
pub fn execute(builder: &RequestBuilder, request: HttpRequest) -> Result<Outcome, Error> {
    let response = match builder.transport() {
        Some(transport) => transport.execute(request)?,
        None => Transport::default().execute(request)?,
    };
    let response = normalize(response)?;
    tracing::debug!(status = response.status, bytes = response.body.len(), "response received");

    if builder.is_allowed(response.status) {
        return Ok(Outcome::Accepted(response));
    }
    tracing::debug!(
        status = response.status,
        allowed = ?builder.allowed_status_codes(),
        "status not in allow-list"
    );
    let error = InvalidStatusCode {
        status: response.status,
    };
    Ok(Outcome::Rejected { response, error })
}

fn normalize(response: http::Response<ureq::Body>) -> Result<Response, Error> {
    let (parts, body) = response.into_parts();
    let mut bytes = Vec::new();
    body.into_reader()
        .read_to_end(&mut bytes)
        .map_err(Error::BodyRead)?;
    let headers = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Ok(Response {
        status: parts.status.as_u16(),
        headers,
        body: bytes,
    })
}

fn send(method: HttpMethod, url: &str, mut options: Vec<RequestOption>) -> Result<Outcome, Error> {
    options.push(set_method(method));
    options.push(set_url(url));
    let (builder, request) = build_request(options)?;
    execute(&builder, request)
}

/// Perform an HTTP GET.
pub fn get(url: &str, options: Vec<RequestOption>) -> Result<Outcome, Error> {
    send(HttpMethod::Get, url, options)
}

/// Perform an HTTP DELETE.
pub fn delete(url: &str, options: Vec<RequestOption>) -> Result<Outcome, Error> {
    send(HttpMethod::Delete, url, options)
}

/// Perform an HTTP POST.
pub fn post(url: &str, options: Vec<RequestOption>) -> Result<Outcome, Error> {
    send(HttpMethod::Post, url, options)
}

/// Perform an HTTP PUT.
pub fn put(url: &str, options: Vec<RequestOption>) -> Result<Outcome, Error> {
    send(HttpMethod::Put, url, options)
}

/// Perform an HTTP HEAD.
pub fn head(url: &str, options: Vec<RequestOption>) -> Result<Outcome, Error> {
    send(HttpMethod::Head, url, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use crate::http::DEFAULT_ACCEPT;
    use crate::options::{content_type, expect_status, json, query_params, set_transport, with_body};
    use crate::transport::TransportConfig;

    fn response(status: u16) -> Response {
        Response {
            status,
            headers: Vec::new(),
            body: b"{}".to_vec(),
        }
    }

    #[test]
    fn build_request_without_options_uses_defaults() {
        let (builder, request) = build_request(Vec::new()).unwrap();
        assert!(builder.allowed_status_codes().is_empty());
        assert_eq!(builder.accept(), Some(DEFAULT_ACCEPT));
        assert_eq!(builder.transport().unwrap().config(), &TransportConfig::default());
        assert_eq!(request.method(), http::Method::GET);
        assert_eq!(request.headers()[http::header::ACCEPT], DEFAULT_ACCEPT);
    }

    #[test]
    fn build_request_with_expected_statuses() {
        let (builder, _) = build_request(vec![expect_status([200, 302])]).unwrap();
        assert_eq!(builder.allowed_status_codes(), &[200, 302]);
    }

    #[test]
    fn build_request_with_custom_transport() {
        let transport = Transport::with_config(TransportConfig {
            timeout: Some(Duration::from_secs(15)),
            ..TransportConfig::default()
        });
        let (builder, _) = build_request(vec![set_transport(transport)]).unwrap();
        assert_eq!(builder.transport().unwrap().config().timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn failing_option_short_circuits() {
        let reached = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&reached);
        let result = build_request(vec![
            RequestOption::new(|_| Err(Error::option("i blew up"))),
            RequestOption::new(move |_| {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }),
        ]);
        let err = result.unwrap_err();
        assert!(matches!(&err, Error::Option(e) if e.to_string() == "i blew up"));
        assert!(!reached.load(Ordering::SeqCst));
    }

    #[test]
    fn verb_options_are_applied_after_caller_options() {
        let mut options = vec![RequestOption::new(|r| {
            r.method = HttpMethod::Delete;
            r.url = Some("http://evil.example/".to_string());
            Ok(())
        })];
        options.push(set_method(HttpMethod::Get));
        options.push(set_url("http://localhost:3000/get"));
        let (builder, request) = build_request(options).unwrap();
        assert_eq!(builder.method(), HttpMethod::Get);
        assert_eq!(request.uri(), "http://localhost:3000/get");
    }

    #[test]
    fn query_params_replace_url_query() {
        let (_, request) = build_request(vec![
            query_params([("foo", "bar")]),
            set_method(HttpMethod::Get),
            set_url("http://localhost:3000/get?existing=1"),
        ])
        .unwrap();
        assert_eq!(request.uri().query(), Some("foo=bar"));
    }

    #[test]
    fn post_body_and_content_type_reach_request() {
        let (_, request) = build_request(vec![
            with_body(&b"this is my body"[..]),
            content_type("text/plain"),
            set_method(HttpMethod::Post),
            set_url("http://localhost:3000/post"),
        ])
        .unwrap();
        assert_eq!(request.method(), http::Method::POST);
        assert_eq!(request.headers()[http::header::CONTENT_TYPE], "text/plain");
        let mut body = Vec::new();
        request.into_body().read_to_end(&mut body).unwrap();
        assert_eq!(body, b"this is my body");
    }

    #[test]
    fn json_then_content_type_override() {
        let (_, request) = build_request(vec![json(), content_type("text/plain")]).unwrap();
        assert_eq!(request.headers()[http::header::ACCEPT], "application/json");
        assert_eq!(request.headers()[http::header::CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn malformed_url_fails_before_sending() {
        let err = get("not a url", Vec::new()).unwrap_err();
        assert!(matches!(err, Error::UrlParse(_)));
    }

    #[test]
    fn accepted_outcome() {
        let outcome = Outcome::Accepted(response(200));
        assert!(outcome.is_accepted());
        assert_eq!(outcome.status_error(), None);
        assert_eq!(outcome.into_result().unwrap().status, 200);
    }

    #[test]
    fn rejected_outcome_keeps_response() {
        let outcome = Outcome::Rejected {
            response: response(200),
            error: InvalidStatusCode { status: 200 },
        };
        assert!(!outcome.is_accepted());
        assert_eq!(outcome.response().status, 200);
        assert_eq!(outcome.status_error(), Some(InvalidStatusCode { status: 200 }));
        let err = outcome.into_result().unwrap_err();
        assert!(matches!(err, Error::InvalidStatusCode(InvalidStatusCode { status: 200 })));
    }
}
