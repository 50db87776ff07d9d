//! Origin pass-through for requests outside the rendering pipeline.

use std::time::Duration;

use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, HeaderMap, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use reqwest::Client;

/// Request/response headers that must not be forwarded between hops.
const HOP_BY_HOP: &[HeaderName] = &[
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

fn skip_request_header(name: &HeaderName) -> bool {
    // reqwest sets host, length, and accept-encoding itself.
    HOP_BY_HOP.contains(name)
        || *name == header::HOST
        || *name == header::CONTENT_LENGTH
        || *name == header::ACCEPT_ENCODING
}

fn skip_response_header(name: &HeaderName) -> bool {
    // The upstream body arrives decompressed, so its framing headers no
    // longer describe what we send.
    HOP_BY_HOP.contains(name)
        || *name == header::CONTENT_LENGTH
        || *name == header::CONTENT_ENCODING
}

/// Thin reverse-proxy client that mirrors the origin's response.
#[derive(Clone)]
pub struct ProxyClient {
    client: Client,
    origin: String,
}

impl ProxyClient {
    pub fn new(origin: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self {
            client,
            origin: origin.trim_end_matches('/').to_string(),
        })
    }

    /// Forward a request to the origin and mirror the response back.
    ///
    /// Never fails the caller: an unreachable origin becomes a 502, the one
    /// case where there is no page left to serve.
    pub async fn pass_through(&self, req: Request) -> Response {
        let path = req.uri().path().to_string();
        match self.forward(req).await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(path = %path, error = %err, "origin unreachable");
                (StatusCode::BAD_GATEWAY, "origin unreachable").into_response()
            }
        }
    }

    async fn forward(&self, req: Request) -> anyhow::Result<Response> {
        let method = req.method().clone();
        let path_and_query = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| req.uri().path().to_string());
        let url = format!("{}{}", self.origin, path_and_query);

        let mut forwarded = HeaderMap::new();
        for (name, value) in req.headers() {
            if !skip_request_header(name) {
                forwarded.insert(name.clone(), value.clone());
            }
        }

        let body = axum::body::to_bytes(req.into_body(), usize::MAX).await?;

        let upstream = self
            .client
            .request(method, &url)
            .headers(forwarded)
            .body(body)
            .send()
            .await?;

        let mut builder = Response::builder().status(upstream.status());
        for (name, value) in upstream.headers() {
            if !skip_response_header(name) {
                builder = builder.header(name, value);
            }
        }
        let bytes = upstream.bytes().await?;
        Ok(builder.body(Body::from(bytes))?)
    }
}
