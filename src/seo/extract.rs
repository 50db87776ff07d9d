//! Read-only SEO metadata extraction, used by the preview tool.

use scraper::{Html, Selector};

/// Metadata pulled out of a rendered document.
#[derive(Debug, Default)]
pub struct PageMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub robots: Option<String>,
    pub canonical: Option<String>,
    /// `og:*` property/content pairs, in document order.
    pub open_graph: Vec<(String, String)>,
    /// `twitter:*` name/content pairs, in document order.
    pub twitter: Vec<(String, String)>,
    /// Parsed JSON-LD blocks.
    pub structured_data: Vec<serde_json::Value>,
    /// JSON-LD blocks that failed to parse.
    pub invalid_structured_data: usize,
}

/// Parse a document and extract its SEO-relevant metadata.
pub fn extract_meta(html: &str) -> PageMeta {
    let document = Html::parse_document(html);
    let mut meta = PageMeta::default();

    let title_sel = Selector::parse("title").unwrap();
    if let Some(el) = document.select(&title_sel).next() {
        let text: String = el.text().collect();
        let text = text.trim().to_string();
        if !text.is_empty() {
            meta.title = Some(text);
        }
    }

    let meta_sel = Selector::parse("meta").unwrap();
    for el in document.select(&meta_sel) {
        let Some(content) = el.value().attr("content") else {
            continue;
        };
        let name = el.value().attr("name").unwrap_or("").to_ascii_lowercase();
        let property = el
            .value()
            .attr("property")
            .unwrap_or("")
            .to_ascii_lowercase();

        match name.as_str() {
            "description" => meta.description = Some(content.to_string()),
            "keywords" => meta.keywords = Some(content.to_string()),
            "robots" => meta.robots = Some(content.to_string()),
            _ => {}
        }
        if property.starts_with("og:") {
            meta.open_graph.push((property.clone(), content.to_string()));
        }
        if name.starts_with("twitter:") {
            meta.twitter.push((name.clone(), content.to_string()));
        } else if property.starts_with("twitter:") {
            meta.twitter.push((property, content.to_string()));
        }
    }

    let link_sel = Selector::parse(r#"link[rel="canonical"]"#).unwrap();
    if let Some(el) = document.select(&link_sel).next() {
        if let Some(href) = el.value().attr("href") {
            meta.canonical = Some(href.to_string());
        }
    }

    let script_sel = Selector::parse(r#"script[type="application/ld+json"]"#).unwrap();
    for el in document.select(&script_sel) {
        let raw: String = el.text().collect();
        match serde_json::from_str(raw.trim()) {
            Ok(value) => meta.structured_data.push(value),
            Err(_) => meta.invalid_structured_data += 1,
        }
    }

    meta
}
