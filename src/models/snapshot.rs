//! Classification and snapshot values produced per request.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// How a request was classified. Derived once per request, before any fetch
/// or fallback decision, and immutable afterwards.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Classification {
    /// The User-Agent matched a known crawler signature.
    pub is_bot: bool,
    /// The request carried an explicit `_snapshot` or `_ssr` query parameter.
    pub is_snapshot_request: bool,
}

impl Classification {
    /// Whether the rendering pipeline should run for this request.
    pub fn should_render(&self) -> bool {
        self.is_bot || self.is_snapshot_request
    }
}

/// A rendered HTML snapshot of a single URL.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub html: String,
    /// HTTP status of whichever upstream produced the HTML.
    pub status: u16,
    /// Response headers from that upstream.
    pub source_headers: HashMap<String, String>,
    pub fetched_at: DateTime<Utc>,
    pub load_time_ms: u64,
    /// True when the external renderer produced the HTML, false when the
    /// origin's own response was used as the fallback.
    pub prerendered: bool,
}
