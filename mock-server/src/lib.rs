//! httpbin-style echo server used to exercise the client end to end.

use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{any, delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What the server saw, echoed back as JSON.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub args: BTreeMap<String, String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub data: String,
}

/// Query of `/redirect-to`: where to send the client and with which status.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RedirectTo {
    pub url: String,
    pub status_code: Option<u16>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Origin {
    pub origin: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/anything", any(echo))
        .route("/anything/{*rest}", any(echo))
        .route("/get", get(echo))
        .route("/post", post(echo))
        .route("/put", put(echo))
        .route("/delete", delete(echo))
        .route("/ip", get(ip))
        .route("/status/{code}", any(status))
        .route("/redirect-to", any(redirect_to))
        .route("/redirect-loop", any(redirect_loop))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(args): Query<BTreeMap<String, String>>,
    body: Bytes,
) -> Json<Echo> {
    tracing::debug!(%method, %uri, "echo");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let url = format!("http://{host}{uri}");
    let headers = headers
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
        .collect();
    Json(Echo {
        method: method.to_string(),
        url,
        args,
        headers,
        data: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn ip() -> Json<Origin> {
    Json(Origin {
        origin: "127.0.0.1".to_string(),
    })
}

async fn redirect_to(Query(target): Query<RedirectTo>) -> impl IntoResponse {
    let status = target
        .status_code
        .and_then(|code| StatusCode::from_u16(code).ok())
        .filter(StatusCode::is_redirection)
        .unwrap_or(StatusCode::FOUND);
    (status, [(header::LOCATION, target.url)])
}

async fn redirect_loop() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/redirect-loop")])
}

async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}
