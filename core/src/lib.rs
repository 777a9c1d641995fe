//! Configurable HTTP request builder and invoker.
//!
//! # Overview
//! Callers pick a verb (`get`, `post`, `put`, `delete`, `head`), a target URL
//! and any number of `RequestOption`s (query parameters, body, content
//! negotiation, accepted statuses, a custom `Transport`). The request is
//! composed, sent once, and the response is returned fully read into memory.
//!
//! # Design
//! - Options are boxed closures applied in order to a single-use
//!   `RequestBuilder`; last write wins per field, except the status
//!   allow-list, which accumulates.
//! - `build_request` exposes composition alone, `execute` runs an already
//!   built request.
//! - A status outside the allow-list is not a failure of the round trip: it
//!   yields `Outcome::Rejected`, carrying both the `Response` and the
//!   `InvalidStatusCode` sentinel.
//!
//! ```no_run
//! use reqopt_core::{get, expect_status, query_params};
//!
//! let outcome = get(
//!     "https://httpbin.org/get",
//!     vec![query_params([("foo", "bar")]), expect_status([200])],
//! )?;
//! println!("{}", outcome.response().text());
//! # Ok::<(), reqopt_core::Error>(())
//! ```

pub mod builder;
pub mod client;
pub mod error;
pub mod http;
pub mod options;
pub mod transport;

pub use builder::RequestBuilder;
pub use client::{build_request, delete, execute, get, head, post, put, Outcome};
pub use error::{BoxError, Error, InvalidStatusCode};
pub use http::{
    HttpMethod, HttpRequest, RequestBody, Response, CONTENT_TYPE_JSON, CONTENT_TYPE_XML,
    DEFAULT_ACCEPT,
};
pub use options::{
    accept, content_type, expect_status, json, query_params, set_transport, with_body, xml,
    RequestOption,
};
pub use transport::{Transport, TransportConfig};
