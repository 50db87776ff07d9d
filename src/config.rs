//! Configuration management for dynrender.
//!
//! Settings are read from a TOML file (`dynrender.toml` in the working
//! directory, or the user config directory, or an explicit `--config` path),
//! then overridden by environment variables. A missing file means built-in
//! defaults; a malformed file is a startup error.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::models::MetaConfig;

/// Default port when only a host is given on the command line.
pub const DEFAULT_PORT: u16 = 8043;

/// Service-identifying User-Agent sent to the rendering service.
pub const SERVICE_USER_AGENT: &str =
    concat!("dynrender/", env!("CARGO_PKG_VERSION"), " (+https://github.com/dynrender/dynrender)");

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub origin: OriginConfig,
    pub renderer: RendererConfig,
    pub cache: CacheConfig,
    pub site: MetaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address for `dynrender serve`.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: format!("127.0.0.1:{DEFAULT_PORT}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Base URL of the application this service fronts.
    pub url: String,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Base URL of the external rendering service. When unset, snapshots
    /// always come from the origin's own response.
    pub base_url: Option<String>,
    /// Timeout for a single renderer call, in seconds.
    pub timeout_secs: u64,
    /// User-Agent sent to the renderer and the origin on snapshot fetches.
    pub user_agent: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 8,
            user_agent: SERVICE_USER_AGENT.to_string(),
        }
    }
}

impl RendererConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds a cached snapshot stays fresh.
    pub ttl_secs: u64,
    /// Entry bound before expired entries are pruned.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            max_entries: 256,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Settings {
    /// Absolute origin URL for a request path (including query).
    pub fn origin_target(&self, path_and_query: &str) -> String {
        format!("{}{}", self.origin.url.trim_end_matches('/'), path_and_query)
    }

    /// Public canonical URL for a request path (query excluded).
    pub fn canonical_for(&self, path: &str) -> String {
        format!("{}{}", self.site.base_url.trim_end_matches('/'), path)
    }
}

/// Load settings from an explicit path, or the first config file found in
/// the default locations, then apply environment overrides.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => default_config_path(),
    };

    let mut settings = match path {
        Some(p) if p.exists() => {
            let raw = fs::read_to_string(&p)
                .with_context(|| format!("failed to read config file {}", p.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("failed to parse config file {}", p.display()))?
        }
        _ => Settings::default(),
    };

    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// `./dynrender.toml` if present, otherwise the user config directory.
fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from("dynrender.toml");
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir().map(|dir| dir.join("dynrender").join("dynrender.toml"))
}

fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(bind) = std::env::var("DYNRENDER_BIND") {
        settings.server.bind = bind;
    }
    if let Ok(url) = std::env::var("DYNRENDER_ORIGIN_URL") {
        settings.origin.url = url;
    }
    if let Ok(url) = std::env::var("DYNRENDER_RENDERER_URL") {
        settings.renderer.base_url = Some(url);
    }
}
