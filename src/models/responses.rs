//! Response DTOs for the cache HTTP API

use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheEntry, CacheStats, EntryState};

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The cached value
    pub payload: Value,
    /// `fresh` or `stale`
    pub state: EntryState,
    /// Whether the caller should revalidate
    pub stale: bool,
    /// Unix timestamp of the last save, if known
    pub stored_at: Option<i64>,
    /// Best-before window as saved, unfuzzed
    pub best_before: Option<u64>,
    /// Unix timestamp at which the entry turns stale, if known
    pub stale_at: Option<i64>,
}

impl GetResponse {
    /// Builds the response from a valid entry; `None` when it has no payload.
    pub fn from_entry(entry: CacheEntry<Value>, now: i64) -> Option<Self> {
        let state = entry.state_at(now);
        let stored_at = entry.stored_at();
        let best_before = entry.base_best_before_seconds();
        let stale_at = entry.stale_at();
        let key = entry.key().to_string();

        entry.into_payload().into_option().map(|payload| Self {
            key,
            payload,
            state,
            stale: state == EntryState::Stale,
            stored_at,
            best_before,
            stale_at,
        })
    }
}

/// Response body for the SET operation (PUT /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
    /// Unix timestamp stamped on the saved entry
    pub stored_at: Option<i64>,
}

impl SetResponse {
    pub fn new(key: impl Into<String>, stored_at: Option<i64>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' saved successfully", key),
            key,
            stored_at,
        }
    }
}

/// Response body for the HAS operation (GET /has/:key)
#[derive(Debug, Clone, Serialize)]
pub struct HasResponse {
    pub key: String,
    pub exists: bool,
}

impl HasResponse {
    pub fn new(key: impl Into<String>, exists: bool) -> Self {
        Self {
            key: key.into(),
            exists,
        }
    }
}

/// Response body for the DELETE operation (DELETE /del/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub total_entries: usize,
    /// hits / (hits + misses)
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
