//! In-memory response cache with a fixed per-instance TTL.
//!
//! Entries expire lazily: there is no background sweep, an expired entry is
//! removed by the first `get` that observes it. There is no capacity bound;
//! key cardinality is bounded by the handful of endpoint cache keys.

use dashmap::DashMap;
use serde_json::Value;
use tokio::time::{Duration, Instant};

struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// Key-value store where every entry lives for the same fixed duration,
/// counted from its last `set`.
pub struct Cache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl Cache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Stores `value` under `key`, overwriting any previous entry and
    /// resetting its expiry to `now + ttl`.
    pub fn set(&self, key: &str, value: Value) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Returns the cached value, or `None` if the key was never set or has
    /// expired. Expired entries are removed on the way out.
    pub fn get(&self, key: &str) -> Option<Value> {
        let expired = match self.entries.get(key) {
            Some(entry) => {
                if Instant::now() <= entry.expires_at {
                    return Some(entry.value.clone());
                }
                true
            }
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    /// Removes a single entry, if present.
    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
