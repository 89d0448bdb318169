//! Fuzzy Cache - fuzzed TTLs and stale-while-revalidate over any key/value store
//!
//! [`CacheStore`] prefixes keys and wraps whatever a [`Backend`] returns into a
//! [`CacheEntry`]. Entries carry a best-before window that separates "stale,
//! refresh soon" from "gone", and their lifetimes are jittered on save so
//! entries written together do not expire together.
//!
//! ```
//! use fuzzy_cache::{CacheEntry, CacheStore, MemoryBackend};
//!
//! let store = CacheStore::with_prefix(MemoryBackend::default(), "app_");
//!
//! let mut entry = store.get::<String>("greeting")?;
//! if entry.is_stale() {
//!     entry.set_payload("hello".to_string()).set_best_before_seconds(30);
//!     store.save(&mut entry)?;
//! }
//! assert_eq!(store.get::<String>("greeting")?.value().map(String::as_str), Some("hello"));
//! # Ok::<(), fuzzy_cache::error::CacheError>(())
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{
    fuzz, fuzz_with, Backend, BackendError, CacheEntry, CacheStore, EntryState, Envelope,
    FuzzFactor, MemoryBackend, Payload,
};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_cleanup_task;
