//! Request DTOs for the cache HTTP API

use serde::Deserialize;
use serde_json::Value;

use crate::cache::MAX_KEY_LENGTH;

/// Request body for the SET operation (PUT /set)
///
/// Omitted `lifetime` and `fuzz` fall back to the service defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key, without prefix
    pub key: String,
    /// Any JSON value except `null`
    pub payload: Value,
    /// Lifetime in seconds
    #[serde(default)]
    pub lifetime: Option<u64>,
    /// Best-before window in seconds
    #[serde(default)]
    pub best_before: Option<u64>,
    /// Jitter factor between 0 and 1
    #[serde(default)]
    pub fuzz: Option<f64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            ));
        }
        // A null payload would be read back as a miss.
        if self.payload.is_null() {
            return Some("Payload cannot be null".to_string());
        }
        None
    }
}
