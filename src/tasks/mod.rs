//! Background Tasks Module
//!
//! # Tasks
//! - Expiry sweep: purges TTL-expired records from the in-memory backend

mod cleanup;

pub use cleanup::spawn_cleanup_task;
