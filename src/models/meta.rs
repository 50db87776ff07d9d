//! Site-level SEO metadata configuration.

use serde::{Deserialize, Serialize};

/// SEO fields injected into served snapshots.
///
/// Supplied by the `[site]` section of the config file. The injector only
/// consumes these values and serializes them into `<head>` tags; empty
/// optional fields are skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaConfig {
    /// Page/site title used for `og:title` and `twitter:title`.
    pub title: String,
    /// Meta description.
    pub description: String,
    /// Comma-separated keywords, if any.
    pub keywords: Option<String>,
    /// Absolute URL of the social preview image, if any.
    pub image: Option<String>,
    /// Open Graph object type.
    pub og_type: String,
    /// Site name for `og:site_name`.
    pub site_name: Option<String>,
    /// Public base URL used to build canonical links (scheme + host).
    pub base_url: String,
    /// Robots directive emitted on enhanced pages.
    pub robots: String,
    /// schema.org JSON-LD payload. When absent a minimal WebSite object is
    /// synthesized from `title` and `base_url`.
    pub structured_data: Option<serde_json::Value>,
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            keywords: None,
            image: None,
            og_type: "website".to_string(),
            site_name: None,
            base_url: "http://localhost".to_string(),
            robots: "index, follow".to_string(),
            structured_data: None,
        }
    }
}

impl MetaConfig {
    /// The JSON-LD value to embed: the configured payload, or a minimal
    /// schema.org WebSite object synthesized from the site fields.
    pub fn structured_data_value(&self) -> serde_json::Value {
        match &self.structured_data {
            Some(value) => value.clone(),
            None => serde_json::json!({
                "@context": "https://schema.org",
                "@type": "WebSite",
                "name": self.title,
                "url": self.base_url,
            }),
        }
    }
}
