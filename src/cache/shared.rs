//! Server-wide TTL cache
//!
//! One process-wide [`SharedCache`] instance backs every cached read endpoint
//! (directory stats, popular topics, health probe). Entries are promoted on
//! read (delete + reinsert at the tail of an insertion-ordered map), so
//! eviction from the head removes the least-recently-used key.

use std::future::Future;
use std::time::Duration;

use indexmap::IndexMap;
use parking_lot::Mutex;
use regex::Regex;
use serde::Serialize;
use tokio::time::Instant;

use crate::error::Result;

/// Hit/miss/eviction counters for observability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

struct Entry<V> {
    value: V,
    created_at: Instant,
    expires_at: Instant,
}

struct Inner<V> {
    entries: IndexMap<String, Entry<V>>,
    stats: CacheStats,
}

/// Bounded string-keyed cache with per-entry TTL and LRU eviction
pub struct TtlCache<V> {
    max_entries: usize,
    inner: Mutex<Inner<V>>,
}

/// The server-wide instance type: JSON values, shared by unrelated features
pub type SharedCache = TtlCache<serde_json::Value>;

impl<V: Clone> TtlCache<V> {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            inner: Mutex::new(Inner {
                entries: IndexMap::new(),
                stats: CacheStats::default(),
            }),
        }
    }

    /// Return the cached value for `key`, computing and storing it on miss.
    ///
    /// A live hit skips `compute` entirely. A failed `compute` propagates its
    /// error and caches nothing, so the next call re-attempts.
    pub async fn with_cache<F, Fut>(&self, key: &str, ttl: Duration, compute: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(value) = self.lookup(key) {
            return Ok(value);
        }
        let value = compute().await?;
        self.store(key, value.clone(), ttl);
        Ok(value)
    }

    /// Live-entry lookup with promotion; expired entries are removed and
    /// count as misses
    fn lookup(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        let Some(entry) = inner.entries.shift_remove(key) else {
            inner.stats.misses += 1;
            return None;
        };
        if entry.expires_at <= now {
            inner.stats.misses += 1;
            return None;
        }
        inner.stats.hits += 1;
        let value = entry.value.clone();
        inner.entries.insert(key.to_string(), entry);
        Some(value)
    }

    /// Insert a value, then evict from the least-recently-used end until the
    /// entry count is within bounds. Runs under one lock acquisition with no
    /// suspension point between the capacity check and the mutation.
    fn store(&self, key: &str, value: V, ttl: Duration) {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        inner.entries.insert(
            key.to_string(),
            Entry {
                value,
                created_at: now,
                expires_at: now + ttl,
            },
        );
        while inner.entries.len() > self.max_entries {
            inner.entries.shift_remove_index(0);
            inner.stats.evictions += 1;
        }
    }

    /// Delete every key matching `pattern`; returns how many were removed
    pub fn invalidate_matching(&self, pattern: &Regex) -> usize {
        let mut inner = self.inner.lock();
        let before = inner.entries.len();
        inner.entries.retain(|key, _| !pattern.is_match(key));
        before - inner.entries.len()
    }

    /// Drop every entry; counters are kept
    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Age of the entry at the least-recently-used end, if any
    pub fn oldest_entry_age(&self) -> Option<Duration> {
        let inner = self.inner.lock();
        inner
            .entries
            .first()
            .map(|(_, entry)| Instant::now().duration_since(entry.created_at))
    }

    /// Current keys in eviction order (least-recently-used first)
    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().entries.keys().cloned().collect()
    }
}
