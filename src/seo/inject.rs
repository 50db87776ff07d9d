//! Head metadata injection for served snapshots.
//!
//! Replace-or-insert semantics over a streaming rewrite: existing managed
//! tags (description/keywords/robots, Open Graph, Twitter Card, canonical
//! link, JSON-LD) are removed while one fresh block is prepended inside
//! `<head>`. Running the injection twice therefore yields the same document
//! instead of duplicated tags.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{anyhow, Context, Result};
use lol_html::html_content::ContentType;
use lol_html::{element, HtmlRewriter, Settings};

use crate::models::MetaConfig;
use crate::utils::escape_attr;

/// `<meta name="...">` values owned by the injector.
const MANAGED_META_NAMES: &[&str] = &["description", "keywords", "robots"];

/// Inject SEO metadata into an HTML document.
///
/// Returns the rewritten document. HTML without a `<head>` element is
/// returned unmodified.
pub fn inject_meta(html: &str, meta: &MetaConfig, canonical: &str) -> Result<String> {
    let block = build_head_block(meta, canonical);
    let saw_head = AtomicBool::new(false);
    let mut output = Vec::with_capacity(html.len() + block.len());

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![
                element!("head", |el| {
                    saw_head.store(true, Ordering::Relaxed);
                    el.prepend(&block, ContentType::Html);
                    Ok(())
                }),
                // Remove managed meta tags so the prepended block replaces
                // them instead of duplicating them.
                element!("meta", |el| {
                    let name = el
                        .get_attribute("name")
                        .unwrap_or_default()
                        .to_ascii_lowercase();
                    let property = el
                        .get_attribute("property")
                        .unwrap_or_default()
                        .to_ascii_lowercase();
                    if MANAGED_META_NAMES.contains(&name.as_str())
                        || name.starts_with("twitter:")
                        || property.starts_with("og:")
                        || property.starts_with("twitter:")
                    {
                        el.remove();
                    }
                    Ok(())
                }),
                element!("link", |el| {
                    let rel = el
                        .get_attribute("rel")
                        .unwrap_or_default()
                        .to_ascii_lowercase();
                    if rel == "canonical" {
                        el.remove();
                    }
                    Ok(())
                }),
                element!("script", |el| {
                    let kind = el
                        .get_attribute("type")
                        .unwrap_or_default()
                        .to_ascii_lowercase();
                    if kind == "application/ld+json" {
                        el.remove();
                    }
                    Ok(())
                }),
            ],
            ..Settings::default()
        },
        |chunk: &[u8]| output.extend_from_slice(chunk),
    );

    rewriter
        .write(html.as_bytes())
        .map_err(|e| anyhow!("HTML rewrite error: {}", e))?;
    rewriter
        .end()
        .map_err(|e| anyhow!("HTML rewrite finalization error: {}", e))?;

    if !saw_head.load(Ordering::Relaxed) {
        tracing::debug!("document has no <head>, skipping meta injection");
        return Ok(html.to_string());
    }

    String::from_utf8(output).context("rewritten HTML is not valid UTF-8")
}

/// Build the tag block prepended inside `<head>`.
fn build_head_block(meta: &MetaConfig, canonical: &str) -> String {
    let mut block = String::new();
    let canonical_attr = escape_attr(canonical);

    let _ = write!(block, r#"<link rel="canonical" href="{canonical_attr}">"#);
    let _ = write!(
        block,
        r#"<meta name="robots" content="{}">"#,
        escape_attr(&meta.robots)
    );

    if !meta.description.is_empty() {
        let _ = write!(
            block,
            r#"<meta name="description" content="{}">"#,
            escape_attr(&meta.description)
        );
    }
    if let Some(keywords) = meta.keywords.as_deref().filter(|k| !k.is_empty()) {
        let _ = write!(
            block,
            r#"<meta name="keywords" content="{}">"#,
            escape_attr(keywords)
        );
    }

    // Open Graph
    if !meta.title.is_empty() {
        let _ = write!(
            block,
            r#"<meta property="og:title" content="{}">"#,
            escape_attr(&meta.title)
        );
    }
    if !meta.description.is_empty() {
        let _ = write!(
            block,
            r#"<meta property="og:description" content="{}">"#,
            escape_attr(&meta.description)
        );
    }
    let _ = write!(
        block,
        r#"<meta property="og:type" content="{}">"#,
        escape_attr(&meta.og_type)
    );
    let _ = write!(block, r#"<meta property="og:url" content="{canonical_attr}">"#);
    if let Some(site_name) = meta.site_name.as_deref().filter(|s| !s.is_empty()) {
        let _ = write!(
            block,
            r#"<meta property="og:site_name" content="{}">"#,
            escape_attr(site_name)
        );
    }
    if let Some(image) = meta.image.as_deref().filter(|i| !i.is_empty()) {
        let _ = write!(
            block,
            r#"<meta property="og:image" content="{}">"#,
            escape_attr(image)
        );
    }

    // Twitter Card
    let card = if meta.image.is_some() {
        "summary_large_image"
    } else {
        "summary"
    };
    let _ = write!(block, r#"<meta name="twitter:card" content="{card}">"#);
    if !meta.title.is_empty() {
        let _ = write!(
            block,
            r#"<meta name="twitter:title" content="{}">"#,
            escape_attr(&meta.title)
        );
    }
    if !meta.description.is_empty() {
        let _ = write!(
            block,
            r#"<meta name="twitter:description" content="{}">"#,
            escape_attr(&meta.description)
        );
    }
    if let Some(image) = meta.image.as_deref().filter(|i| !i.is_empty()) {
        let _ = write!(
            block,
            r#"<meta name="twitter:image" content="{}">"#,
            escape_attr(image)
        );
    }

    // JSON-LD. serde_json output never contains a raw `</script>`, but `<`
    // still gets escaped to keep the block safe inside a script element.
    let json = serde_json::to_string(&meta.structured_data_value())
        .unwrap_or_else(|_| "{}".to_string())
        .replace('<', "\\u003c");
    let _ = write!(block, r#"<script type="application/ld+json">{json}</script>"#);

    block
}
