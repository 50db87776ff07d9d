//! The edge request pipeline.
//!
//! Per-request flow: static assets pass straight through; everything else is
//! classified from the User-Agent and query string; crawler traffic and
//! explicit snapshot requests get a rendered snapshot with rewritten head
//! metadata; everyone else is proxied untouched. Any failure inside the
//! enhancement path degrades to plain pass-through.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::Response;

use crate::detect;
use crate::models::Classification;
use crate::render::SnapshotCache;
use crate::seo;

use super::super::AppState;

/// Entry point for every request that is not a reserved diagnostics route.
pub async fn edge_request(State(state): State<AppState>, req: Request) -> Response {
    let path = req.uri().path().to_string();

    // Static assets are never intercepted: no classification, no injection.
    if detect::is_static_resource(&path) {
        return state.proxy.pass_through(req).await;
    }

    // The rendering pipeline only makes sense for page loads.
    if req.method() != Method::GET {
        return state.proxy.pass_through(req).await;
    }

    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    // Classification happens before any fetch or fallback decision.
    let classification = Classification {
        is_bot: detect::is_bot(user_agent.as_deref()),
        is_snapshot_request: has_snapshot_param(req.uri().query()),
    };

    if !classification.should_render() {
        return state.proxy.pass_through(req).await;
    }

    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| path.clone());

    match enhanced_response(
        &state,
        &path,
        &path_and_query,
        &classification,
        user_agent.as_deref(),
    )
    .await
    {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(path = %path, error = %err, "enhancement failed, passing request through");
            state.proxy.pass_through(req).await
        }
    }
}

/// Run the snapshot + injection pipeline and build the enhanced response.
async fn enhanced_response(
    state: &AppState,
    path: &str,
    path_and_query: &str,
    classification: &Classification,
    user_agent: Option<&str>,
) -> anyhow::Result<Response> {
    let target = state.settings.origin_target(path_and_query);
    let cache_key = SnapshotCache::key(&target, classification.is_bot);

    let (snapshot, cache_hit) = match state.cache.get(&cache_key) {
        Some(snapshot) => (snapshot, true),
        None => {
            let snapshot = state.render.fetch(&target).await?;
            state.cache.insert(cache_key, snapshot.clone());
            (snapshot, false)
        }
    };

    let canonical = state.settings.canonical_for(path);
    let html = seo::inject_meta(&snapshot.html, &state.settings.site, &canonical)?;

    tracing::info!(
        path = %path,
        bot = classification.is_bot,
        prerendered = snapshot.prerendered,
        cache_hit,
        load_time_ms = snapshot.load_time_ms,
        fetched_at = %snapshot.fetched_at,
        "served enhanced snapshot"
    );

    let mut builder = Response::builder()
        .status(StatusCode::from_u16(snapshot.status).unwrap_or(StatusCode::OK))
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .header(header::CACHE_CONTROL, "public, max-age=3600, s-maxage=7200")
        .header(header::VARY, "User-Agent")
        .header("x-prerendered", bool_header(snapshot.prerendered))
        .header("x-enhanced-ssr", "true")
        .header("x-bot-detected", bool_header(classification.is_bot))
        .header(
            "x-snapshot-request",
            bool_header(classification.is_snapshot_request),
        )
        .header("x-snapshot-cache", if cache_hit { "hit" } else { "miss" });

    // Validators from the upstream still apply to the rewritten document.
    if let Some(last_modified) = snapshot.source_headers.get("last-modified") {
        if let Ok(value) = HeaderValue::from_str(last_modified) {
            builder = builder.header(header::LAST_MODIFIED, value);
        }
    }

    if let Some(ua) = user_agent {
        if let Ok(value) = HeaderValue::from_str(ua) {
            builder = builder.header("x-user-agent", value);
        }
    }

    Ok(builder.body(Body::from(html))?)
}

fn bool_header(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Whether the query string carries an explicit snapshot parameter.
fn has_snapshot_param(query: Option<&str>) -> bool {
    let Some(query) = query else {
        return false;
    };
    query.split('&').any(|pair| {
        let key = pair.split('=').next().unwrap_or(pair);
        key == "_snapshot" || key == "_ssr"
    })
}
