//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::{DEFAULT_FUZZ_FACTOR, DEFAULT_LIFETIME_SECONDS, DEFAULT_MAX_ENTRIES};

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Prefix prepended to every backend key
    pub prefix: String,
    /// Lifetime in seconds for entries saved without one
    pub default_lifetime: u64,
    /// Jitter factor for entries saved without one
    pub fuzz_factor: f64,
    /// Maximum number of records the in-memory backend holds
    pub max_entries: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_PREFIX` - Backend key prefix (default: empty)
    /// - `DEFAULT_LIFETIME` - Entry lifetime in seconds (default: 60)
    /// - `FUZZ_FACTOR` - TTL jitter factor (default: 0.05)
    /// - `MAX_ENTRIES` - Maximum backend records (default: 1000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    ///
    /// Unparseable values fall back to the default. The fuzz factor's range
    /// is checked when the application state is built.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            prefix: env::var("CACHE_PREFIX").unwrap_or(defaults.prefix),
            default_lifetime: parse_var("DEFAULT_LIFETIME").unwrap_or(defaults.default_lifetime),
            fuzz_factor: parse_var("FUZZ_FACTOR").unwrap_or(defaults.fuzz_factor),
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            default_lifetime: DEFAULT_LIFETIME_SECONDS,
            fuzz_factor: DEFAULT_FUZZ_FACTOR,
            max_entries: DEFAULT_MAX_ENTRIES,
            server_port: 3000,
            cleanup_interval: 1,
        }
    }
}
