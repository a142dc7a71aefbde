//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoizingCache;

/// Spawns a background task that periodically purges expired cache entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between purge runs. Expired entries are already treated as absent by
/// lookups, so the sweep only reclaims memory and fires eviction listeners
/// for entries nobody touches again.
///
/// # Arguments
/// * `cache` - shared reference to the cache to sweep
/// * `cleanup_interval_secs` - Interval in seconds between purge runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(MemoizingCache::builder(1000).build()?);
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), 1);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task<K, V>(
    cache: Arc<MemoizingCache<K, V>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired();

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let cache: Arc<MemoizingCache<String, String>> = Arc::new(
            MemoizingCache::builder(100)
                .ttl(Duration::from_millis(50))
                .build()
                .unwrap(),
        );

        cache
            .get_with("expire_soon".to_string(), || async {
                Ok("value".to_string())
            })
            .await
            .unwrap();
        assert_eq!(cache.len(), 1);

        let handle = spawn_cleanup_task(cache.clone(), 1);

        // Wait for the entry to expire and at least one sweep to run
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(cache.len(), 0, "Expired entry should have been purged");

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_valid_entries() {
        let cache: Arc<MemoizingCache<String, String>> = Arc::new(
            MemoizingCache::builder(100)
                .ttl(Duration::from_secs(3600))
                .build()
                .unwrap(),
        );

        cache
            .get_with("long_lived".to_string(), || async {
                Ok("value".to_string())
            })
            .await
            .unwrap();

        let handle = spawn_cleanup_task(cache.clone(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(cache.len(), 1, "Valid entry should not be removed");

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_tasks_sweep_every_cache() {
        // One sweep task per cache, as the server wires it
        let students: Arc<MemoizingCache<u64, String>> = Arc::new(
            MemoizingCache::builder(100)
                .ttl(Duration::from_millis(50))
                .build()
                .unwrap(),
        );
        let counter: Arc<MemoizingCache<&'static str, u64>> = Arc::new(
            MemoizingCache::builder(100)
                .ttl(Duration::from_millis(50))
                .build()
                .unwrap(),
        );

        students
            .get_with(1, || async { Ok("Ada".to_string()) })
            .await
            .unwrap();
        counter.get_with("counter", || async { Ok(1_u64) }).await.unwrap();

        let handles = vec![
            spawn_cleanup_task(students.clone(), 1),
            spawn_cleanup_task(counter.clone(), 1),
        ];

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(students.len(), 0, "student cache should have been swept");
        assert_eq!(counter.len(), 0, "counter cache should have been swept");

        for handle in handles {
            handle.abort();
        }
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let cache: Arc<MemoizingCache<String, String>> =
            Arc::new(MemoizingCache::builder(100).build().unwrap());

        let handle = spawn_cleanup_task(cache, 1);

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
