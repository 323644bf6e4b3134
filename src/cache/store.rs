//! TTL cache storage.
//!
//! A process-wide string-keyed store for computed response payloads. Entries
//! carry an absolute expiry fixed at insertion; a read past the expiry
//! evicts the entry and reports a miss ("refresh on write", never on read).
//! There is no background sweep: lazy eviction plus wholesale invalidation
//! after writes keeps the store correct, and memory is bounded by the small,
//! enumerable key space of the public endpoints.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use metrics::counter;
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{debug, warn};

struct CacheEntry {
    data: Value,
    expires_at: OffsetDateTime,
}

/// String-keyed TTL cache for public response payloads.
pub struct TtlStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl Default for TtlStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TtlStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    // A panic while holding the lock poisons it; every entry is a disposable
    // cached payload, so the map stays usable and the next TTL expiry or
    // invalidation corrects anything half-written.
    fn entries_read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.read().unwrap_or_else(|poisoned| {
            warn!("cache entries lock poisoned by a panicking writer, reading through");
            poisoned.into_inner()
        })
    }

    fn entries_write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.write().unwrap_or_else(|poisoned| {
            warn!("cache entries lock poisoned by a panicking writer, writing through");
            poisoned.into_inner()
        })
    }

    /// Look up a key, evicting it first if it has expired.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries_write();
        match entries.get(key) {
            Some(entry) if OffsetDateTime::now_utc() > entry.expires_at => {
                entries.remove(key);
                counter!("corale_cache_expired_total").increment(1);
                counter!("corale_cache_miss_total").increment(1);
                debug!(key, result = "expired", "cache lookup");
                None
            }
            Some(entry) => {
                counter!("corale_cache_hit_total").increment(1);
                Some(entry.data.clone())
            }
            None => {
                counter!("corale_cache_miss_total").increment(1);
                None
            }
        }
    }

    /// Insert or overwrite unconditionally. The expiry is fixed here and
    /// never extended by later reads.
    pub fn set(&self, key: impl Into<String>, data: Value, ttl: Duration) {
        let entry = CacheEntry {
            data,
            expires_at: OffsetDateTime::now_utc() + ttl,
        };
        self.entries_write().insert(key.into(), entry);
    }

    /// Exact-match delete; idempotent.
    pub fn invalidate(&self, key: &str) {
        self.entries_write().remove(key);
    }

    /// Delete every key starting with `prefix`. Used after mutations that
    /// can affect an unbounded number of cached aggregates, e.g. any circle
    /// write versus every cached circle list page.
    pub fn invalidate_by_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries_write();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        let dropped = before - entries.len();
        if dropped > 0 {
            counter!("corale_cache_invalidated_total").increment(dropped as u64);
            debug!(prefix, dropped, "cache prefix invalidation");
        }
        dropped
    }

    /// Drop everything. Admin tooling and test isolation, not normal traffic.
    pub fn clear(&self) {
        self.entries_write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries_read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
