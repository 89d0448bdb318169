//! In-Memory Backend Module
//!
//! A [`Backend`] holding raw values in a `HashMap` with per-record TTL and
//! least-recently-used eviction once `max_entries` is reached.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::cache::backend::{Backend, BackendError};
use crate::cache::entry::current_timestamp_ms;
use crate::cache::CacheStats;

/// Capacity used by [`MemoryBackend::default`].
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

// == Record ==
#[derive(Debug, Clone)]
struct Record {
    value: Value,
    /// Unix milliseconds, `None` = no expiry
    expires_at_ms: Option<u64>,
    /// Logical access clock for LRU ordering
    last_access: u64,
}

impl Record {
    /// Expired once the current time reaches the expiry instant.
    fn is_expired_at(&self, now_ms: u64) -> bool {
        matches!(self.expires_at_ms, Some(expires) if now_ms >= expires)
    }
}

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<String, Record>,
    clock: u64,
    stats: CacheStats,
}

impl Inner {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn purge_expired(&mut self, now_ms: u64) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| !record.is_expired_at(now_ms));
        let removed = before - self.records.len();
        self.stats.record_expirations(removed);
        removed
    }

    fn evict_least_recent(&mut self) -> Option<String> {
        let key = self
            .records
            .iter()
            .min_by_key(|(_, record)| record.last_access)
            .map(|(key, _)| key.clone())?;

        self.records.remove(&key);
        self.stats.record_eviction();
        Some(key)
    }
}

// == Memory Backend ==
/// Process-local backend, mainly for tests and single-node deployments.
#[derive(Debug)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
    max_entries: usize,
}

impl MemoryBackend {
    /// Creates a backend holding at most `max_entries` records (minimum 1).
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            max_entries: max_entries.max(1),
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Records currently held, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().records.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.total_entries = inner.records.len();
        stats
    }

    /// Drops every record whose TTL has elapsed and returns how many went.
    pub fn cleanup_expired(&self) -> usize {
        self.inner.lock().purge_expired(current_timestamp_ms())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl Backend for MemoryBackend {
    fn fetch(&self, key: &str) -> Result<Option<Value>, BackendError> {
        let now = current_timestamp_ms();
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        match inner.records.get(key).map(|record| record.is_expired_at(now)) {
            None => {
                inner.stats.record_miss();
                Ok(None)
            }
            Some(true) => {
                inner.records.remove(key);
                inner.stats.record_expirations(1);
                inner.stats.record_miss();
                Ok(None)
            }
            Some(false) => {
                let tick = inner.tick();
                inner.stats.record_hit();
                Ok(inner.records.get_mut(key).map(|record| {
                    record.last_access = tick;
                    record.value.clone()
                }))
            }
        }
    }

    fn store(&self, key: &str, value: Value, ttl_seconds: u64) -> Result<(), BackendError> {
        let now = current_timestamp_ms();
        let expires_at_ms =
            (ttl_seconds > 0).then(|| now.saturating_add(ttl_seconds.saturating_mul(1000)));

        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        if !inner.records.contains_key(key) && inner.records.len() >= self.max_entries {
            // Reclaim expired space before sacrificing a live record.
            if inner.purge_expired(now) == 0 {
                if let Some(evicted) = inner.evict_least_recent() {
                    debug!(key = %evicted, "evicted least recently used record");
                }
            }
        }

        let last_access = inner.tick();
        inner.records.insert(
            key.to_string(),
            Record {
                value,
                expires_at_ms,
                last_access,
            },
        );
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool, BackendError> {
        let now = current_timestamp_ms();
        let inner = self.inner.lock();
        Ok(inner
            .records
            .get(key)
            .is_some_and(|record| !record.is_expired_at(now)))
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.inner.lock().records.remove(key);
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_backend_new() {
        let backend = MemoryBackend::new(100);
        assert_eq!(backend.len(), 0);
        assert!(backend.is_empty());
        assert_eq!(MemoryBackend::new(0).max_entries(), 1);
    }

    #[test]
    fn test_store_and_fetch() {
        let backend = MemoryBackend::new(100);

        backend.store("key1", json!("value1"), 300).unwrap();

        assert_eq!(backend.fetch("key1").unwrap(), Some(json!("value1")));
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn test_fetch_nonexistent() {
        let backend = MemoryBackend::new(100);
        assert_eq!(backend.fetch("nonexistent").unwrap(), None);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let backend = MemoryBackend::new(100);

        backend.store("key1", json!(1), 300).unwrap();
        backend.remove("key1").unwrap();
        backend.remove("key1").unwrap();

        assert!(backend.is_empty());
        assert!(!backend.contains("key1").unwrap());
    }

    #[test]
    fn test_overwrite() {
        let backend = MemoryBackend::new(100);

        backend.store("key1", json!("value1"), 300).unwrap();
        backend.store("key1", json!("value2"), 300).unwrap();

        assert_eq!(backend.fetch("key1").unwrap(), Some(json!("value2")));
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn test_ttl_expiration() {
        let backend = MemoryBackend::new(100);

        backend.store("key1", json!("value1"), 1).unwrap();
        assert!(backend.contains("key1").unwrap());

        sleep(Duration::from_millis(1100));

        assert!(!backend.contains("key1").unwrap());
        assert_eq!(backend.fetch("key1").unwrap(), None);
        assert_eq!(backend.stats().expirations, 1);
    }

    #[test]
    fn test_zero_ttl_never_expires() {
        let backend = MemoryBackend::new(100);
        backend.store("forever", json!(true), 0).unwrap();

        let mut guard = backend.inner.lock();
        let record = guard.records.get_mut("forever").unwrap();
        assert!(record.expires_at_ms.is_none());
        assert!(!record.is_expired_at(u64::MAX));
    }

    #[test]
    fn test_lru_eviction() {
        let backend = MemoryBackend::new(3);

        backend.store("key1", json!(1), 300).unwrap();
        backend.store("key2", json!(2), 300).unwrap();
        backend.store("key3", json!(3), 300).unwrap();
        backend.store("key4", json!(4), 300).unwrap();

        assert_eq!(backend.len(), 3);
        assert!(!backend.contains("key1").unwrap());
        assert!(backend.contains("key4").unwrap());
        assert_eq!(backend.stats().evictions, 1);
    }

    #[test]
    fn test_lru_touch_on_fetch() {
        let backend = MemoryBackend::new(3);

        backend.store("key1", json!(1), 300).unwrap();
        backend.store("key2", json!(2), 300).unwrap();
        backend.store("key3", json!(3), 300).unwrap();

        backend.fetch("key1").unwrap();
        backend.store("key4", json!(4), 300).unwrap();

        assert!(backend.contains("key1").unwrap());
        assert!(!backend.contains("key2").unwrap());
    }

    #[test]
    fn test_full_backend_reclaims_expired_before_evicting() {
        let backend = MemoryBackend::new(2);

        backend.store("short", json!(1), 1).unwrap();
        backend.store("long", json!(2), 300).unwrap();
        sleep(Duration::from_millis(1100));

        backend.store("new", json!(3), 300).unwrap();

        assert!(backend.contains("long").unwrap());
        assert!(backend.contains("new").unwrap());
        assert_eq!(backend.stats().evictions, 0);
        assert_eq!(backend.stats().expirations, 1);
    }

    #[test]
    fn test_stats() {
        let backend = MemoryBackend::new(100);

        backend.store("key1", json!("value1"), 300).unwrap();
        backend.fetch("key1").unwrap();
        backend.fetch("nonexistent").unwrap();
        backend.contains("key1").unwrap();

        let stats = backend.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_cleanup_expired() {
        let backend = MemoryBackend::new(100);

        backend.store("key1", json!("value1"), 1).unwrap();
        backend.store("key2", json!("value2"), 10).unwrap();

        sleep(Duration::from_millis(1100));

        assert_eq!(backend.cleanup_expired(), 1);
        assert_eq!(backend.len(), 1);
        assert!(backend.contains("key2").unwrap());
    }
}
