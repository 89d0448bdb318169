//! Cache Store Module
//!
//! Applies a key prefix and translates between [`CacheEntry`] values and the
//! raw envelopes a [`Backend`] holds. Freshness decisions live on the entry.
//!
//! `get`, caller mutation and `save` on one key form a read-modify-write
//! sequence with no locking: concurrent writers race and the last write
//! wins. Callers needing at most one recompute per key must serialize
//! access themselves.

use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::entry::current_timestamp;
use crate::cache::{Backend, CacheEntry};
use crate::error::Result;

// == Cache Store ==
/// Prefixing front end over a pluggable backend.
#[derive(Debug, Clone)]
pub struct CacheStore<B> {
    backend: B,
    prefix: String,
}

impl<B: Backend> CacheStore<B> {
    // == Constructors ==
    /// Creates a store with an empty prefix.
    pub fn new(backend: B) -> Self {
        Self::with_prefix(backend, "")
    }

    /// Creates a store whose backend keys are all `prefix + key`.
    pub fn with_prefix(backend: B, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
        }
    }

    // == Accessors ==
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn set_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.prefix = prefix.into();
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn set_backend(&mut self, backend: B) -> &mut Self {
        self.backend = backend;
        self
    }

    fn backend_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    // == Get ==
    /// Reads the entry for `key`.
    ///
    /// A missing key yields an absent entry, not an error.
    ///
    /// # Errors
    /// Backend failures and undecodable values.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<CacheEntry<T>> {
        let raw = self.backend.fetch(&self.backend_key(key))?;
        CacheEntry::from_raw(key, raw)
    }

    // == Save ==
    /// Stamps the entry with the current time and writes its envelope.
    ///
    /// The backend TTL is the entry's fuzzed lifetime, drawn once here.
    pub fn save<T: Serialize>(&self, entry: &mut CacheEntry<T>) -> Result<&Self> {
        self.save_with(entry, current_timestamp(), &mut rand::thread_rng())
    }

    /// [`Self::save`] with an explicit clock reading and random source.
    ///
    /// A positive lifetime never fuzzes below one second, since a TTL of
    /// `0` means "no expiry" to most backends.
    ///
    /// # Errors
    /// [`crate::error::CacheError::NullPayload`] if a present payload encodes
    /// to `null`; nothing is written in that case.
    pub fn save_with<T: Serialize, R: Rng + ?Sized>(
        &self,
        entry: &mut CacheEntry<T>,
        now: i64,
        rng: &mut R,
    ) -> Result<&Self> {
        entry.set_stored_at(now);
        let ttl_seconds = match entry.base_lifetime_seconds() {
            0 => 0,
            _ => entry.lifetime_seconds_with(rng).max(1),
        };
        let value = entry.envelope().to_value()?;

        self.backend
            .store(&self.backend_key(entry.key()), value, ttl_seconds)?;
        Ok(self)
    }

    // == Has Key ==
    pub fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.backend.contains(&self.backend_key(key))?)
    }

    // == Delete ==
    pub fn delete(&self, key: &str) -> Result<&Self> {
        self.backend.remove(&self.backend_key(key))?;
        Ok(self)
    }
}
