//! Expiry Sweep Task
//!
//! Periodically drops records whose TTL has elapsed from a shared
//! [`MemoryBackend`], so memory is reclaimed even for keys nobody reads again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryBackend;

/// Spawns the sweep loop on the tokio runtime.
///
/// The first sweep runs one `interval_secs` after spawning. Abort the
/// returned handle to stop it during shutdown.
pub fn spawn_cleanup_task(backend: Arc<MemoryBackend>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "starting expiry sweep task");

        loop {
            tokio::time::sleep(interval).await;

            match backend.cleanup_expired() {
                0 => debug!("expiry sweep: nothing to remove"),
                removed => info!(removed, "expiry sweep: removed expired records"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Backend;
    use serde_json::json;

    #[tokio::test]
    async fn test_sweep_removes_expired_records() {
        let backend = Arc::new(MemoryBackend::new(100));
        backend.store("expire_soon", json!("value"), 1).unwrap();

        let handle = spawn_cleanup_task(backend.clone(), 1);

        // Wait for the record to expire and a sweep to run
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(backend.len(), 0, "expired record should have been swept");
        assert_eq!(backend.stats().expirations, 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_preserves_live_records() {
        let backend = Arc::new(MemoryBackend::new(100));
        backend.store("long_lived", json!("value"), 3600).unwrap();
        backend.store("forever", json!("value"), 0).unwrap();

        let handle = spawn_cleanup_task(backend.clone(), 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(backend.len(), 2);
        assert_eq!(backend.fetch("long_lived").unwrap(), Some(json!("value")));

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_can_be_aborted() {
        let handle = spawn_cleanup_task(Arc::new(MemoryBackend::default()), 1);

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "task should be finished after abort");
    }
}
