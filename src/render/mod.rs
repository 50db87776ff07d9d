//! Snapshot acquisition: external renderer first, origin fallback.
//!
//! A single attempt is made against the rendering service; on any failure
//! (non-2xx, transport error, timeout) the origin's own response is used
//! instead. There are no retries and no circuit breaker. Renderer
//! unavailability is never surfaced past this module's caller: the worst
//! case is serving the un-enhanced origin page.

mod cache;

pub use cache::SnapshotCache;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::Client;
use thiserror::Error;

use crate::models::Snapshot;

/// Errors from obtaining a snapshot.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("renderer returned status {0}")]
    RendererStatus(reqwest::StatusCode),
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// HTTP client for obtaining rendered snapshots.
#[derive(Clone)]
pub struct RenderClient {
    client: Client,
    renderer_base: Option<String>,
    timeout: Duration,
}

impl RenderClient {
    /// Create a new render client.
    ///
    /// `renderer_base` is the base URL of the external rendering service;
    /// when `None`, every fetch goes straight to the origin.
    pub fn new(
        renderer_base: Option<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, RenderError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            renderer_base,
            timeout,
        })
    }

    /// Obtain a snapshot for `url`, preferring the external renderer and
    /// falling back to the origin response on any renderer failure.
    ///
    /// Returns an error only when the fallback itself fails.
    pub async fn fetch(&self, url: &str) -> Result<Snapshot, RenderError> {
        if let Some(base) = &self.renderer_base {
            match self.fetch_prerendered(base, url).await {
                Ok(snapshot) => return Ok(snapshot),
                Err(err) => {
                    tracing::warn!(url, error = %err, "renderer unavailable, falling back to origin");
                }
            }
        }
        self.fetch_origin(url).await
    }

    /// Fetch prerendered HTML from the external rendering service.
    ///
    /// The target URL is percent-encoded into the endpoint path:
    /// `GET {base}/{encoded url}`.
    async fn fetch_prerendered(&self, base: &str, url: &str) -> Result<Snapshot, RenderError> {
        let endpoint = format!("{}/{}", base.trim_end_matches('/'), urlencoding::encode(url));

        let start = Instant::now();
        let response = self
            .client
            .get(&endpoint)
            .timeout(self.timeout)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(RenderError::RendererStatus(response.status()));
        }

        let status = response.status().as_u16();
        let source_headers = header_map(response.headers());
        let html = response.text().await?;

        Ok(Snapshot {
            html,
            status,
            source_headers,
            fetched_at: Utc::now(),
            load_time_ms: start.elapsed().as_millis() as u64,
            prerendered: true,
        })
    }

    /// Fetch the origin's own response for the target URL.
    ///
    /// Any status is accepted: an origin 404 page is still the page to
    /// serve. Only transport failures are errors.
    async fn fetch_origin(&self, url: &str) -> Result<Snapshot, RenderError> {
        let start = Instant::now();
        let response = self.client.get(url).timeout(self.timeout).send().await?;

        let status = response.status().as_u16();
        let source_headers = header_map(response.headers());
        let html = response.text().await?;

        Ok(Snapshot {
            html,
            status,
            source_headers,
            fetched_at: Utc::now(),
            load_time_ms: start.elapsed().as_millis() as u64,
            prerendered: false,
        })
    }
}

/// Extract response headers into a plain map, skipping non-UTF-8 values.
fn header_map(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for (name, value) in headers {
        if let Ok(v) = value.to_str() {
            map.insert(name.to_string(), v.to_string());
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(renderer: Option<String>) -> RenderClient {
        RenderClient::new(renderer, Duration::from_secs(2), "dynrender-test/0.0").unwrap()
    }

    #[tokio::test]
    async fn test_prerendered_snapshot() {
        let mut renderer = mockito::Server::new_async().await;
        let origin = mockito::Server::new_async().await;

        let target = format!("{}/about", origin.url());
        let encoded = urlencoding::encode(&target).into_owned();
        let mock = renderer
            .mock("GET", format!("/{encoded}").as_str())
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><head></head><body>rendered</body></html>")
            .create_async()
            .await;

        let client = test_client(Some(renderer.url()));
        let snapshot = client.fetch(&target).await.unwrap();

        mock.assert_async().await;
        assert!(snapshot.prerendered);
        assert_eq!(snapshot.status, 200);
        assert!(snapshot.html.contains("rendered"));
        assert_eq!(
            snapshot.source_headers.get("content-type").map(String::as_str),
            Some("text/html")
        );
    }

    #[tokio::test]
    async fn test_renderer_failure_falls_back_to_origin() {
        let mut renderer = mockito::Server::new_async().await;
        let mut origin = mockito::Server::new_async().await;

        renderer
            .mock("GET", mockito::Matcher::Any)
            .with_status(502)
            .create_async()
            .await;
        let origin_mock = origin
            .mock("GET", "/")
            .with_status(200)
            .with_body("<html><head></head><body>origin</body></html>")
            .create_async()
            .await;

        let client = test_client(Some(renderer.url()));
        let snapshot = client.fetch(&format!("{}/", origin.url())).await.unwrap();

        origin_mock.assert_async().await;
        assert!(!snapshot.prerendered);
        assert!(snapshot.html.contains("origin"));
    }

    #[tokio::test]
    async fn test_no_renderer_configured_uses_origin() {
        let mut origin = mockito::Server::new_async().await;
        origin
            .mock("GET", "/page")
            .with_status(200)
            .with_body("<html><body>plain</body></html>")
            .create_async()
            .await;

        let client = test_client(None);
        let snapshot = client.fetch(&format!("{}/page", origin.url())).await.unwrap();
        assert!(!snapshot.prerendered);
        assert!(snapshot.html.contains("plain"));
    }

    #[tokio::test]
    async fn test_origin_error_status_is_not_an_error() {
        let mut origin = mockito::Server::new_async().await;
        origin
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("<html><body>not found</body></html>")
            .create_async()
            .await;

        let client = test_client(None);
        let snapshot = client
            .fetch(&format!("{}/missing", origin.url()))
            .await
            .unwrap();
        assert_eq!(snapshot.status, 404);
        assert!(snapshot.html.contains("not found"));
    }
}
