/// TTL response cache
///
/// Keys are canonical per-operation strings; values are the raw JSON
/// payloads exactly as fetched. Freshness is decided at read time, so there
/// is no eviction task: a stale entry simply stops being served and sits in
/// the map until the next successful fetch overwrites it.
use crate::logger::{self, LogTag};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Value,
    pub stored_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

/// Per-key view for the operational surface
#[derive(Debug, Clone, Serialize)]
pub struct CacheKeyStatus {
    pub key: String,
    pub age_secs: u64,
    pub fresh: bool,
}

/// Snapshot returned by [`ResponseCache::status`]
///
/// `count` and `keys` cover every entry physically present, stale ones
/// included; `entries` adds age and freshness per key.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub count: usize,
    pub keys: Vec<String>,
    pub entries: Vec<CacheKeyStatus>,
}

#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Fresh value for `key`, or None (absent and stale look identical)
    pub async fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if entry.is_fresh(self.ttl) => {
                logger::debug(LogTag::Cache, &format!("HIT {}", key));
                Some(entry.value.clone())
            }
            Some(_) => {
                logger::debug(LogTag::Cache, &format!("EXPIRED {}", key));
                None
            }
            None => {
                logger::debug(LogTag::Cache, &format!("MISS {}", key));
                None
            }
        }
    }

    /// Store `value` under `key`, replacing any previous entry
    pub async fn put(&self, key: &str, value: Value) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop every entry (manual invalidation)
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        let dropped = entries.len();
        entries.clear();
        logger::debug(LogTag::Cache, &format!("Cleared {} entries", dropped));
    }

    pub async fn status(&self) -> CacheStatus {
        let entries = self.entries.read().await;

        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();

        let per_key = keys
            .iter()
            .map(|key| {
                let entry = &entries[key];
                CacheKeyStatus {
                    key: key.clone(),
                    age_secs: entry.stored_at.elapsed().as_secs(),
                    fresh: entry.is_fresh(self.ttl),
                }
            })
            .collect();

        CacheStatus {
            count: entries.len(),
            keys,
            entries: per_key,
        }
    }
}
