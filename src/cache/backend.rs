//! Backend Module
//!
//! The capability a key/value store must expose for [`CacheStore`] to sit in
//! front of it. Persistence, eviction and transport are the backend's concern.
//!
//! [`CacheStore`]: crate::cache::CacheStore

use std::sync::Arc;

use serde_json::Value;

/// Error type returned by backends, passed through to callers untouched.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

// == Backend ==
/// Raw key/value storage with per-key TTL.
///
/// Implementations take `&self` and synchronize internally so a single
/// backend can be shared across threads.
pub trait Backend: Send + Sync {
    /// Returns the stored value, or `None` when the key is missing or expired.
    fn fetch(&self, key: &str) -> Result<Option<Value>, BackendError>;

    /// Writes `value` under `key`. A `ttl_seconds` of 0 means no expiry.
    fn store(&self, key: &str, value: Value, ttl_seconds: u64) -> Result<(), BackendError>;

    /// Whether a live value exists under `key`.
    fn contains(&self, key: &str) -> Result<bool, BackendError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), BackendError>;
}

impl<B: Backend + ?Sized> Backend for Arc<B> {
    fn fetch(&self, key: &str) -> Result<Option<Value>, BackendError> {
        (**self).fetch(key)
    }

    fn store(&self, key: &str, value: Value, ttl_seconds: u64) -> Result<(), BackendError> {
        (**self).store(key, value, ttl_seconds)
    }

    fn contains(&self, key: &str) -> Result<bool, BackendError> {
        (**self).contains(key)
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        (**self).remove(key)
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn fetch(&self, key: &str) -> Result<Option<Value>, BackendError> {
        (**self).fetch(key)
    }

    fn store(&self, key: &str, value: Value, ttl_seconds: u64) -> Result<(), BackendError> {
        (**self).store(key, value, ttl_seconds)
    }

    fn contains(&self, key: &str) -> Result<bool, BackendError> {
        (**self).contains(key)
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        (**self).remove(key)
    }
}
