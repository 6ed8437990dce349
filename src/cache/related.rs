//! Endpoint-local cache for the related-skills route
//!
//! A separate instance from [`crate::cache::SharedCache`]; the two share no
//! storage, so eviction pressure from unrelated features never touches this
//! route's entries. Keys are `"{skillId}:{limit}"`.

use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::related::RelatedSkillsResult;

/// Cache key for one (skill, limit) request shape
pub fn related_key(skill_id: &str, limit: i64) -> String {
    format!("{skill_id}:{limit}")
}

struct Entry {
    value: Arc<RelatedSkillsResult>,
    expires_at: Instant,
}

/// Bounded TTL cache holding computed related-skills results
pub struct RelatedCache {
    ttl: Duration,
    max_entries: usize,
    entries: Mutex<IndexMap<String, Entry>>,
}

impl RelatedCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries,
            entries: Mutex::new(IndexMap::new()),
        }
    }

    /// Fetch a live entry, promoting it to most-recently-used. An expired
    /// entry is removed and reads as a miss.
    pub fn get(&self, key: &str) -> Option<Arc<RelatedSkillsResult>> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let entry = entries.shift_remove(key)?;
        if entry.expires_at <= now {
            return None;
        }
        let value = entry.value.clone();
        entries.insert(key.to_string(), entry);
        Some(value)
    }

    /// Store a freshly computed result, evicting the single oldest key first
    /// when at capacity
    pub fn insert(&self, key: String, value: Arc<RelatedSkillsResult>) {
        let mut entries = self.entries.lock();
        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            entries.shift_remove_index(0);
        }
        entries.insert(
            key,
            Entry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}
