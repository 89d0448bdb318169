//! Cache Module
//!
//! Fuzzed-TTL, stale-while-revalidate cache entries and the prefixing store
//! that reads and writes them through a pluggable backend.

mod backend;
mod entry;
mod envelope;
mod memory;
mod stats;
mod store;


// Re-export public types
pub use backend::{Backend, BackendError};
pub use entry::{
    current_timestamp, fuzz, fuzz_with, CacheEntry, EntryState, FuzzFactor, Payload,
    DEFAULT_FUZZ_FACTOR, DEFAULT_LIFETIME_SECONDS,
};
pub use envelope::Envelope;
pub use memory::{MemoryBackend, DEFAULT_MAX_ENTRIES};
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
