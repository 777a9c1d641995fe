//! Composable request options.
//!
//! Each option changes one concern of a `RequestBuilder`. Options targeting
//! the same field overwrite each other in application order, except
//! `expect_status`, which accumulates. `query_params` replaces the whole
//! mapping rather than merging keys.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;

use crate::builder::RequestBuilder;
use crate::error::Error;
use crate::http::{HttpMethod, RequestBody, CONTENT_TYPE_JSON, CONTENT_TYPE_XML};
use crate::transport::Transport;

type ApplyFn = Box<dyn FnOnce(&mut RequestBuilder) -> Result<(), Error> + Send>;

/// A deferred configuration step applied to a `RequestBuilder`.
pub struct RequestOption(ApplyFn);

impl RequestOption {
    /// Build a custom option, e.g. one that validates the builder and fails.
    pub fn new<F>(apply: F) -> Self
    where
        F: FnOnce(&mut RequestBuilder) -> Result<(), Error> + Send + 'static,
    {
        Self(Box::new(apply))
    }

    pub(crate) fn apply(self, builder: &mut RequestBuilder) -> Result<(), Error> {
        (self.0)(builder)
    }
}

impl fmt::Debug for RequestOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RequestOption")
    }
}

/// Send the request through `transport` instead of a fresh default one.
pub fn set_transport(transport: Transport) -> RequestOption {
    RequestOption::new(move |r| {
        r.transport = Some(transport);
        Ok(())
    })
}

/// Replace the query parameters. The last `query_params` applied wins.
pub fn query_params<K, V>(params: impl IntoIterator<Item = (K, V)>) -> RequestOption
where
    K: Into<String>,
    V: Into<String>,
{
    let params: BTreeMap<String, String> = params
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    RequestOption::new(move |r| {
        r.query_params = params;
        Ok(())
    })
}

/// Send and accept JSON.
pub fn json() -> RequestOption {
    RequestOption::new(|r| {
        r.accept = Some(CONTENT_TYPE_JSON.to_string());
        r.content_type = Some(CONTENT_TYPE_JSON.to_string());
        Ok(())
    })
}

/// Send and accept XML.
pub fn xml() -> RequestOption {
    RequestOption::new(|r| {
        r.accept = Some(CONTENT_TYPE_XML.to_string());
        r.content_type = Some(CONTENT_TYPE_XML.to_string());
        Ok(())
    })
}

pub fn content_type(value: impl Into<String>) -> RequestOption {
    let value = value.into();
    RequestOption::new(move |r| {
        r.content_type = Some(value);
        Ok(())
    })
}

pub fn accept(value: impl Into<String>) -> RequestOption {
    let value = value.into();
    RequestOption::new(move |r| {
        r.accept = Some(value);
        Ok(())
    })
}

/// Add `codes` to the allow-list checked against the response status.
pub fn expect_status(codes: impl IntoIterator<Item = u16>) -> RequestOption {
    let codes: Vec<u16> = codes.into_iter().collect();
    RequestOption::new(move |r| {
        r.allowed_status_codes.extend(codes);
        Ok(())
    })
}

pub fn with_body(reader: impl Read + Send + 'static) -> RequestOption {
    let body = RequestBody::from_reader(reader);
    RequestOption::new(move |r| {
        r.body = body;
        Ok(())
    })
}

pub(crate) fn set_method(method: HttpMethod) -> RequestOption {
    RequestOption::new(move |r| {
        r.method = method;
        Ok(())
    })
}

pub(crate) fn set_url(url: &str) -> RequestOption {
    let url = url.to_string();
    RequestOption::new(move |r| {
        r.url = Some(url);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::transport::TransportConfig;

    fn apply_all(options: Vec<RequestOption>) -> RequestBuilder {
        let mut b = RequestBuilder::new();
        for option in options {
            option.apply(&mut b).unwrap();
        }
        b
    }

    #[test]
    fn json_sets_both_headers() {
        let b = apply_all(vec![json()]);
        assert_eq!(b.accept(), Some(CONTENT_TYPE_JSON));
        assert_eq!(b.content_type(), Some(CONTENT_TYPE_JSON));
    }

    #[test]
    fn xml_sets_both_headers() {
        let b = apply_all(vec![xml()]);
        assert_eq!(b.accept(), Some("application/xml"));
        assert_eq!(b.content_type(), Some("application/xml"));
    }

    #[test]
    fn later_content_type_overrides_json_only_for_that_field() {
        let b = apply_all(vec![json(), content_type("text/plain")]);
        assert_eq!(b.accept(), Some(CONTENT_TYPE_JSON));
        assert_eq!(b.content_type(), Some("text/plain"));
    }

    #[test]
    fn accept_overrides_independently() {
        let b = apply_all(vec![xml(), accept("application/octet")]);
        assert_eq!(b.accept(), Some("application/octet"));
        assert_eq!(b.content_type(), Some("application/xml"));
    }

    #[test]
    fn expect_status_accumulates_in_order() {
        let b = apply_all(vec![expect_status([200, 302]), expect_status([404])]);
        assert_eq!(b.allowed_status_codes(), &[200, 302, 404]);
    }

    #[test]
    fn query_params_last_wins_wholesale() {
        let b = apply_all(vec![
            query_params([("foo", "bar"), ("keep", "me")]),
            query_params([("baz", "qux")]),
        ]);
        assert_eq!(b.query_params().len(), 1);
        assert_eq!(b.query_params()["baz"], "qux");
    }

    #[test]
    fn set_transport_replaces_default() {
        let transport = Transport::with_config(TransportConfig {
            timeout: Some(Duration::from_secs(15)),
            ..TransportConfig::default()
        });
        let b = apply_all(vec![set_transport(transport)]);
        assert_eq!(b.transport().unwrap().config().timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn with_body_attaches_stream() {
        let b = apply_all(vec![with_body(std::io::Cursor::new(b"hello".to_vec()))]);
        assert!(b.has_body());
    }

    #[test]
    fn internal_options_fix_method_and_url() {
        let b = apply_all(vec![set_method(HttpMethod::Put), set_url("http://localhost/put")]);
        assert_eq!(b.method(), HttpMethod::Put);
        assert_eq!(b.url(), Some("http://localhost/put"));
    }

    #[test]
    fn custom_option_can_fail() {
        let mut b = RequestBuilder::new();
        let err = RequestOption::new(|_| Err(Error::option("i blew up")))
            .apply(&mut b)
            .unwrap_err();
        assert_eq!(err.to_string(), "request option failed: i blew up");
    }
}
