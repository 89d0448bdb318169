//! Cache Entry Module
//!
//! Defines a single cached value together with its freshness metadata,
//! the TTL fuzz algorithm and the absent / fresh / stale state machine.

use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::cache::Envelope;
use crate::error::{CacheError, Result};

// == Public Constants ==
/// Lifetime applied to entries that never had one set explicitly.
pub const DEFAULT_LIFETIME_SECONDS: u64 = 60;

/// Jitter applied to durations unless overridden (5%).
pub const DEFAULT_FUZZ_FACTOR: f64 = 0.05;

// == Payload ==
/// The cached value, or the explicit absence of one.
///
/// Falsy values (`0`, `""`, `[]`) are `Present`; only a cache miss or an
/// explicitly cleared entry is `Absent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload<T> {
    Absent,
    Present(T),
}

impl<T> Payload<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Payload::Present(_))
    }

    pub fn is_absent(&self) -> bool {
        !self.is_present()
    }

    /// Borrows the inner value, keeping the variant.
    pub fn as_ref(&self) -> Payload<&T> {
        match self {
            Payload::Absent => Payload::Absent,
            Payload::Present(value) => Payload::Present(value),
        }
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Payload::Absent => None,
            Payload::Present(value) => Some(value),
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Payload::Absent => None,
            Payload::Present(value) => Some(value),
        }
    }
}

impl<T> Default for Payload<T> {
    fn default() -> Self {
        Payload::Absent
    }
}

impl<T> From<Option<T>> for Payload<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Payload::Present(value),
            None => Payload::Absent,
        }
    }
}

// An absent payload is written as `null`, and `null` reads back as absent.
impl<T: Serialize> Serialize for Payload<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Payload::Absent => serializer.serialize_none(),
            Payload::Present(value) => serializer.serialize_some(value),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Payload<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Payload::from)
    }
}

// == Fuzz Factor ==
/// Fractional jitter applied to durations, validated to lie in `[0, 1]`.
///
/// A factor of `0` disables fuzzing. Values above `1` are rejected because
/// they would allow a fuzzed duration to drop below zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct FuzzFactor(f64);

impl FuzzFactor {
    /// No jitter at all.
    pub const NONE: FuzzFactor = FuzzFactor(0.0);

    /// Validates and wraps a raw factor.
    ///
    /// # Errors
    /// Returns [`CacheError::InvalidFuzzFactor`] for NaN, infinite, negative
    /// or greater-than-one values.
    pub fn new(factor: f64) -> Result<Self> {
        if factor.is_finite() && (0.0..=1.0).contains(&factor) {
            Ok(Self(factor))
        } else {
            Err(CacheError::InvalidFuzzFactor(factor))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Largest deviation `fuzz` may apply to `duration`: `ceil(duration * factor)`.
    pub fn spread(self, duration: u64) -> u64 {
        (duration as f64 * self.0).ceil() as u64
    }
}

impl Default for FuzzFactor {
    fn default() -> Self {
        Self(DEFAULT_FUZZ_FACTOR)
    }
}

impl TryFrom<f64> for FuzzFactor {
    type Error = CacheError;

    fn try_from(factor: f64) -> Result<Self> {
        Self::new(factor)
    }
}

// == Fuzz ==
/// Randomly perturbs `duration` by up to `ceil(duration * factor)` in either
/// direction, using the thread-local generator.
pub fn fuzz(duration: u64, factor: FuzzFactor) -> u64 {
    fuzz_with(duration, factor, &mut rand::thread_rng())
}

/// Same as [`fuzz`] with a caller-supplied random source.
///
/// Draws `delta` uniformly from `[0, spread]`, then subtracts or adds it
/// with equal probability.
pub fn fuzz_with<R: Rng + ?Sized>(duration: u64, factor: FuzzFactor, rng: &mut R) -> u64 {
    let spread = factor.spread(duration);
    if spread == 0 {
        return duration;
    }

    let delta = rng.gen_range(0..=spread);
    if rng.gen_bool(0.5) {
        duration.saturating_sub(delta)
    } else {
        duration.saturating_add(delta)
    }
}

// == Entry State ==
/// Conceptual state of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryState {
    /// No payload; must be recomputed.
    Absent,
    /// Payload present and inside its best-before window.
    Fresh,
    /// Payload present but due for revalidation.
    Stale,
}

// == Cache Entry ==
/// One cache slot: a payload plus the metadata that governs its freshness.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    key: String,
    payload: Payload<T>,
    lifetime_seconds: u64,
    best_before_seconds: Option<u64>,
    stored_at: Option<i64>,
    fuzz_factor: FuzzFactor,
}

impl<T> CacheEntry<T> {
    // == Constructors ==
    /// Creates an entry with no payload, as returned for a cache miss.
    pub fn empty(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            payload: Payload::Absent,
            lifetime_seconds: DEFAULT_LIFETIME_SECONDS,
            best_before_seconds: None,
            stored_at: None,
            fuzz_factor: FuzzFactor::default(),
        }
    }

    /// Creates an entry holding a freshly computed value.
    pub fn with_value(key: impl Into<String>, value: T) -> Self {
        Self::empty(key).with_payload(value)
    }

    /// Rebuilds an entry from a decoded envelope.
    pub fn from_envelope(key: impl Into<String>, envelope: Envelope<T>) -> Self {
        let mut entry = Self::empty(key);
        entry.payload = envelope.payload;
        entry.best_before_seconds = envelope.best_before;
        entry.stored_at = envelope.stored_at;
        entry
    }

    // == Validity ==
    /// True when there is no payload. Inverse of [`Self::is_valid`].
    pub fn is_expired(&self) -> bool {
        self.payload.is_absent()
    }

    /// True when the entry holds a payload.
    pub fn is_valid(&self) -> bool {
        !self.is_expired()
    }

    // == Payload ==
    pub fn payload(&self) -> &Payload<T> {
        &self.payload
    }

    /// The payload value, if present.
    pub fn value(&self) -> Option<&T> {
        self.payload.as_option()
    }

    pub fn into_payload(self) -> Payload<T> {
        self.payload
    }

    pub fn set_payload(&mut self, value: T) -> &mut Self {
        self.payload = Payload::Present(value);
        self
    }

    pub fn clear_payload(&mut self) -> &mut Self {
        self.payload = Payload::Absent;
        self
    }

    pub fn with_payload(mut self, value: T) -> Self {
        self.set_payload(value);
        self
    }

    // == Key ==
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn set_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.key = key.into();
        self
    }

    // == Lifetime ==
    pub fn set_lifetime_seconds(&mut self, seconds: u64) -> &mut Self {
        self.lifetime_seconds = seconds;
        self
    }

    pub fn with_lifetime_seconds(mut self, seconds: u64) -> Self {
        self.set_lifetime_seconds(seconds);
        self
    }

    /// Lifetime to hand to the backend.
    ///
    /// Fuzzed only while no best-before is set; once a best-before exists it
    /// is the fuzzed value and the lifetime is reported exactly.
    pub fn lifetime_seconds(&self) -> u64 {
        self.lifetime_seconds_with(&mut rand::thread_rng())
    }

    pub fn lifetime_seconds_with<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        match self.best_before_seconds {
            None => fuzz_with(self.lifetime_seconds, self.fuzz_factor, rng),
            Some(_) => self.lifetime_seconds,
        }
    }

    /// The lifetime as set, never fuzzed.
    pub fn base_lifetime_seconds(&self) -> u64 {
        self.lifetime_seconds
    }

    // == Best Before ==
    pub fn set_best_before_seconds(&mut self, seconds: impl Into<Option<u64>>) -> &mut Self {
        self.best_before_seconds = seconds.into();
        self
    }

    pub fn with_best_before_seconds(mut self, seconds: impl Into<Option<u64>>) -> Self {
        self.set_best_before_seconds(seconds);
        self
    }

    /// Fuzzed best-before window, or `None` when unset.
    pub fn best_before_seconds(&self) -> Option<u64> {
        self.best_before_seconds_with(&mut rand::thread_rng())
    }

    pub fn best_before_seconds_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<u64> {
        self.best_before_seconds
            .map(|seconds| fuzz_with(seconds, self.fuzz_factor, rng))
    }

    /// The best-before window as set, never fuzzed.
    pub fn base_best_before_seconds(&self) -> Option<u64> {
        self.best_before_seconds
    }

    // == Fuzz Factor ==
    pub fn fuzz_factor(&self) -> f64 {
        self.fuzz_factor.value()
    }

    /// # Errors
    /// Rejects factors outside `[0, 1]` instead of clamping them.
    pub fn set_fuzz_factor(&mut self, factor: f64) -> Result<&mut Self> {
        self.fuzz_factor = FuzzFactor::new(factor)?;
        Ok(self)
    }

    pub fn with_fuzz_factor(mut self, factor: FuzzFactor) -> Self {
        self.fuzz_factor = factor;
        self
    }

    // == Stored At ==
    pub fn stored_at(&self) -> Option<i64> {
        self.stored_at
    }

    pub fn set_stored_at(&mut self, timestamp: impl Into<Option<i64>>) -> &mut Self {
        self.stored_at = timestamp.into();
        self
    }

    // == Staleness ==
    /// Epoch second at which the entry turns stale, when both the stored
    /// time and the best-before window are known.
    pub fn stale_at(&self) -> Option<i64> {
        match (self.stored_at, self.best_before_seconds) {
            (Some(stored_at), Some(best_before)) => {
                let window = i64::try_from(best_before).unwrap_or(i64::MAX);
                Some(stored_at.saturating_add(window))
            }
            _ => None,
        }
    }

    /// Whether the entry should be revalidated, judged against the clock.
    pub fn is_stale(&self) -> bool {
        self.is_stale_at(current_timestamp())
    }

    /// Whether the entry should be revalidated at `now` (epoch seconds).
    ///
    /// Without both a stored time and a best-before window there is nothing
    /// to measure, so staleness falls back to validity: only an absent
    /// payload is stale.
    pub fn is_stale_at(&self, now: i64) -> bool {
        match self.stale_at() {
            Some(stale_at) => stale_at <= now,
            None => self.is_expired(),
        }
    }

    pub fn state(&self) -> EntryState {
        self.state_at(current_timestamp())
    }

    pub fn state_at(&self, now: i64) -> EntryState {
        if self.is_expired() {
            EntryState::Absent
        } else if self.is_stale_at(now) {
            EntryState::Stale
        } else {
            EntryState::Fresh
        }
    }

    // == Envelope ==
    /// The persisted view of this entry, built from raw unfuzzed values.
    pub fn envelope(&self) -> Envelope<&T> {
        Envelope {
            best_before: self.best_before_seconds,
            stored_at: self.stored_at,
            payload: self.payload.as_ref(),
        }
    }

    pub fn into_envelope(self) -> Envelope<T> {
        Envelope {
            best_before: self.best_before_seconds,
            stored_at: self.stored_at,
            payload: self.payload,
        }
    }
}

impl<T: DeserializeOwned> CacheEntry<T> {
    /// Builds an entry from whatever a backend returned for `key`.
    ///
    /// `None` is a miss. A JSON object carrying a `payload` member is an
    /// envelope; anything else is a legacy raw payload.
    ///
    /// # Errors
    /// Returns [`CacheError::Serialization`] when the value cannot be
    /// decoded into `T` or the envelope metadata is malformed.
    pub fn from_raw(key: impl Into<String>, raw: Option<Value>) -> Result<Self> {
        let envelope = Envelope::from_raw(raw)?;
        Ok(Self::from_envelope(key, envelope))
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in seconds.
pub fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}
