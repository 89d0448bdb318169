//! Envelope Module
//!
//! The structure persisted to a backend for every saved entry, and the
//! decoding of raw backend values (envelopes or legacy bare payloads).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::Payload;
use crate::error::{CacheError, Result};

/// Member whose presence marks a backend value as an envelope.
const PAYLOAD_FIELD: &str = "payload";

// == Envelope ==
/// Persisted shape of a cache entry.
///
/// All three members are always written, `null` when unset:
///
/// ```json
/// { "bestBefore": 30, "storedAt": 1700000000, "payload": "..." }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    /// Freshness window in seconds
    pub best_before: Option<u64>,
    /// Unix timestamp (seconds) of the save that wrote this envelope
    #[serde(alias = "storedTime")]
    pub stored_at: Option<i64>,
    /// The cached value
    #[serde(default = "Payload::default")]
    pub payload: Payload<T>,
}

impl<T> Envelope<T> {
    /// An envelope with nothing in it, as produced by a cache miss.
    pub fn absent() -> Self {
        Self {
            best_before: None,
            stored_at: None,
            payload: Payload::Absent,
        }
    }

    /// Wraps a bare payload with no freshness metadata.
    pub fn bare(payload: Payload<T>) -> Self {
        Self {
            payload,
            ..Self::absent()
        }
    }
}

impl<T: Serialize> Envelope<T> {
    /// Encodes the envelope into the value handed to the backend.
    ///
    /// # Errors
    /// [`CacheError::NullPayload`] when a present payload encodes to `null`,
    /// since `null` is how an absent payload is written.
    pub fn to_value(&self) -> Result<Value> {
        let value = serde_json::to_value(self)?;
        if self.payload.is_present() && value[PAYLOAD_FIELD].is_null() {
            return Err(CacheError::NullPayload);
        }
        Ok(value)
    }
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Decodes whatever a backend returned.
    ///
    /// A JSON object with a `payload` member is read as an envelope. Any
    /// other value predates envelopes and is taken as the payload itself.
    pub fn from_raw(raw: Option<Value>) -> Result<Self> {
        match raw {
            None => Ok(Self::absent()),
            Some(value) if is_envelope(&value) => Ok(serde_json::from_value(value)?),
            Some(value) => {
                let payload: Payload<T> = serde_json::from_value(value)?;
                Ok(Self::bare(payload))
            }
        }
    }
}

fn is_envelope(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|object| object.contains_key(PAYLOAD_FIELD))
}
