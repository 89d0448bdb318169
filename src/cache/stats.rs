//! Backend Statistics Module
//!
//! Counters kept by [`MemoryBackend`](crate::cache::MemoryBackend) for hits,
//! misses, capacity evictions and TTL expirations.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of in-memory backend activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Fetches that found a live record
    pub hits: u64,
    /// Fetches that found nothing, or only an expired record
    pub misses: u64,
    /// Records dropped to stay within capacity
    pub evictions: u64,
    /// Records dropped because their TTL elapsed
    pub expirations: u64,
    /// Records currently held
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// hits / (hits + misses), or 0.0 before any fetch.
    pub fn hit_rate(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub(crate) fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        assert_eq!(CacheStats::new(), CacheStats::default());
        assert_eq!(CacheStats::new().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_record_evictions_and_expirations() {
        let mut stats = CacheStats::new();
        stats.record_eviction();
        stats.record_expirations(3);
        stats.record_expirations(0);

        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.expirations, 3);
    }
}
