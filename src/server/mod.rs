//! The edge service: bot-aware rendering proxy in front of an origin site.
//!
//! Crawler traffic (and explicit `?_snapshot=1` requests) receives a
//! prerendered, meta-injected snapshot; everything else is proxied through
//! untouched, with diagnostic `x-*` headers on enhanced responses.

mod handlers;
mod proxy;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Settings;
use crate::render::{RenderClient, SnapshotCache};

use proxy::ProxyClient;

/// Timeout for plain pass-through proxying. Generous compared to the
/// renderer timeout: the origin is the thing we trust to answer.
const PROXY_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared state for the edge service.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub render: RenderClient,
    pub proxy: ProxyClient,
    pub cache: Arc<SnapshotCache>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let render = RenderClient::new(
            settings.renderer.base_url.clone(),
            settings.renderer.timeout(),
            &settings.renderer.user_agent,
        )?;
        let proxy = ProxyClient::new(&settings.origin.url, PROXY_TIMEOUT)?;

        Ok(Self {
            settings: Arc::new(settings.clone()),
            render,
            proxy,
            cache: Arc::new(SnapshotCache::new(
                settings.cache.ttl(),
                settings.cache.max_entries,
            )),
            started_at: Instant::now(),
        })
    }
}

/// Start the edge service.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting dynrender at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    const GOOGLEBOT_UA: &str = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";
    const CHROME_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    fn test_settings(origin: &str, renderer: Option<&str>) -> Settings {
        let mut settings = Settings::default();
        settings.origin.url = origin.to_string();
        settings.renderer.base_url = renderer.map(str::to_string);
        settings.renderer.timeout_secs = 2;
        settings.site.title = "Jane Doe - SEO Consultant".to_string();
        settings.site.description = "Technical SEO consulting".to_string();
        settings.site.base_url = "https://janedoe.example".to_string();
        settings.site.structured_data = Some(serde_json::json!({
            "@context": "https://schema.org",
            "@type": "Person",
            "name": "Jane Doe",
        }));
        settings
    }

    fn test_app(origin: &str, renderer: Option<&str>) -> axum::Router {
        let state = AppState::new(&test_settings(origin, renderer)).unwrap();
        create_router(state)
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get(uri: &str, user_agent: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("user-agent", user_agent)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_googlebot_gets_enhanced_snapshot() {
        let mut renderer = mockito::Server::new_async().await;
        let origin = mockito::Server::new_async().await;

        renderer
            .mock("GET", mockito::Matcher::Any)
            .with_status(200)
            .with_body("<html><head><title>Prerendered</title></head><body>app</body></html>")
            .create_async()
            .await;

        let app = test_app(&origin.url(), Some(&renderer.url()));
        let response = app.oneshot(get("/", GOOGLEBOT_UA)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers().clone();
        assert_eq!(headers.get("x-bot-detected").unwrap(), "true");
        assert_eq!(headers.get("x-prerendered").unwrap(), "true");
        assert_eq!(headers.get("x-enhanced-ssr").unwrap(), "true");
        assert_eq!(headers.get("vary").unwrap(), "User-Agent");
        assert_eq!(
            headers.get("content-type").unwrap(),
            "text/html; charset=utf-8"
        );

        let body = body_string(response).await;
        assert!(body.contains(r#"<script type="application/ld+json">"#));
        assert!(body.contains(r#"<link rel="canonical" href="https://janedoe.example/">"#));
        assert!(body.contains("<title>Prerendered</title>"));
    }

    #[tokio::test]
    async fn test_static_asset_passes_through_unchanged() {
        let mut origin = mockito::Server::new_async().await;
        origin
            .mock("GET", "/style.css")
            .with_status(200)
            .with_header("content-type", "text/css")
            .with_body("body { margin: 0 }")
            .create_async()
            .await;

        // Even with a crawler UA, static paths bypass the pipeline.
        let app = test_app(&origin.url(), None);
        let response = app.oneshot(get("/style.css", CHROME_UA)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("x-bot-detected").is_none());
        assert!(response.headers().get("x-enhanced-ssr").is_none());
        assert_eq!(body_string(response).await, "body { margin: 0 }");
    }

    #[tokio::test]
    async fn test_explicit_snapshot_request_from_browser() {
        let mut origin = mockito::Server::new_async().await;
        origin
            .mock("GET", "/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("<html><head></head><body>client app</body></html>")
            .create_async()
            .await;

        let app = test_app(&origin.url(), None);
        let response = app.oneshot(get("/?_snapshot=1", CHROME_UA)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("x-bot-detected").unwrap(), "false");
        assert_eq!(response.headers().get("x-snapshot-request").unwrap(), "true");

        let body = body_string(response).await;
        assert!(body.contains("application/ld+json"));
        assert!(body.contains("client app"));
    }

    #[tokio::test]
    async fn test_renderer_failure_serves_origin_html() {
        let mut renderer = mockito::Server::new_async().await;
        let mut origin = mockito::Server::new_async().await;

        renderer
            .mock("GET", mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;
        origin
            .mock("GET", "/")
            .with_status(200)
            .with_body("<html><head></head><body>origin fallback</body></html>")
            .create_async()
            .await;

        let app = test_app(&origin.url(), Some(&renderer.url()));
        let response = app.oneshot(get("/", GOOGLEBOT_UA)).await.unwrap();

        // Renderer failure must never surface to the client.
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("x-prerendered").unwrap(), "false");
        assert_eq!(response.headers().get("x-bot-detected").unwrap(), "true");

        let body = body_string(response).await;
        assert!(body.contains("origin fallback"));
        assert!(body.contains("<html"));
    }

    #[tokio::test]
    async fn test_browser_traffic_passes_through() {
        let mut origin = mockito::Server::new_async().await;
        origin
            .mock("GET", "/about")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body>spa shell</body></html>")
            .create_async()
            .await;

        let app = test_app(&origin.url(), None);
        let response = app.oneshot(get("/about", CHROME_UA)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("x-enhanced-ssr").is_none());
        assert_eq!(body_string(response).await, "<html><body>spa shell</body></html>");
    }

    #[tokio::test]
    async fn test_second_bot_request_hits_cache() {
        let mut renderer = mockito::Server::new_async().await;
        let origin = mockito::Server::new_async().await;

        let mock = renderer
            .mock("GET", mockito::Matcher::Any)
            .with_status(200)
            .with_body("<html><head></head><body>cached</body></html>")
            .expect(1)
            .create_async()
            .await;

        let app = test_app(&origin.url(), Some(&renderer.url()));

        let first = app.clone().oneshot(get("/", GOOGLEBOT_UA)).await.unwrap();
        assert_eq!(first.headers().get("x-snapshot-cache").unwrap(), "miss");

        let second = app.oneshot(get("/", GOOGLEBOT_UA)).await.unwrap();
        assert_eq!(second.headers().get("x-snapshot-cache").unwrap(), "hit");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let origin = mockito::Server::new_async().await;
        let app = test_app(&origin.url(), None);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/_dynrender/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["service"], "dynrender");
        assert_eq!(json["renderer_configured"], false);
        assert!(json["cache"]["entries"].is_u64());
    }

    #[tokio::test]
    async fn test_missing_user_agent_is_not_a_bot() {
        let mut origin = mockito::Server::new_async().await;
        origin
            .mock("GET", "/")
            .with_status(200)
            .with_body("<html><body>shell</body></html>")
            .create_async()
            .await;

        let app = test_app(&origin.url(), None);
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("x-enhanced-ssr").is_none());
    }
}
