//! Short-TTL in-memory cache for rendered snapshots.
//!
//! Keyed by normalized target URL plus the bot flag, so the `cache-control`
//! header the edge handler advertises is backed by real behavior. Snapshots
//! are cheap to regenerate; entries simply expire and get pruned on insert
//! once the map grows past its bound.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::models::Snapshot;

/// A cached snapshot with expiration time.
struct CacheEntry {
    snapshot: Snapshot,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(snapshot: Snapshot, ttl: Duration) -> Self {
        Self {
            snapshot,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    fn get(&self) -> Option<Snapshot> {
        if self.is_expired() {
            None
        } else {
            Some(self.snapshot.clone())
        }
    }
}

/// TTL-bounded snapshot cache.
pub struct SnapshotCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
}

impl SnapshotCache {
    /// Create a new cache.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_entries,
        }
    }

    /// Build a cache key from the target URL and bot flag.
    ///
    /// The URL is normalized (fragment dropped, explicit snapshot parameters
    /// stripped) so crawler traffic and `?_snapshot=1` requests for the same
    /// page share an entry per bot flag.
    pub fn key(url: &str, is_bot: bool) -> String {
        let normalized = match url::Url::parse(url) {
            Ok(mut parsed) => {
                parsed.set_fragment(None);
                let kept: Vec<(String, String)> = parsed
                    .query_pairs()
                    .filter(|(k, _)| k != "_snapshot" && k != "_ssr")
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect();
                if kept.is_empty() {
                    parsed.set_query(None);
                } else {
                    parsed
                        .query_pairs_mut()
                        .clear()
                        .extend_pairs(kept.iter().map(|(k, v)| (k.as_str(), v.as_str())));
                }
                parsed.to_string()
            }
            Err(_) => url.to_string(),
        };
        format!("{}|bot:{}", normalized, is_bot)
    }

    /// Get a fresh snapshot, or None if expired/missing.
    pub fn get(&self, key: &str) -> Option<Snapshot> {
        self.entries
            .read()
            .ok()
            .and_then(|guard| guard.get(key).and_then(|e| e.get()))
    }

    /// Insert a snapshot, pruning expired entries when the map is full.
    pub fn insert(&self, key: String, snapshot: Snapshot) {
        if let Ok(mut guard) = self.entries.write() {
            guard.insert(key, CacheEntry::new(snapshot, self.ttl));
            if guard.len() > self.max_entries {
                guard.retain(|_, entry| !entry.is_expired());
            }
        }
    }

    /// Number of entries currently held (including expired, not yet pruned).
    pub fn len(&self) -> usize {
        self.entries.read().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Seconds entries stay fresh.
    pub fn ttl_secs(&self) -> u64 {
        self.ttl.as_secs()
    }
}
