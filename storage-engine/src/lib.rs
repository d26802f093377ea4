pub mod moka_store;
pub mod sled_store;

pub use moka_store::MokaResultStore;
pub use sled_store::SledResultStore;

use relay::{ResultStore, StorageFactory, StoreConfig};
use shared::Result;
use shared::config::StoreBackend;
use std::sync::Arc;

/// Factory that builds whichever backend the configuration names
#[derive(Clone, Copy, Debug, Default)]
pub struct UnifiedStorageFactory;

impl StorageFactory for UnifiedStorageFactory {
    fn create_from_config(&self, config: &StoreConfig) -> Result<Arc<dyn ResultStore>> {
        match &config.backend {
            StoreBackend::Memory => Ok(Arc::new(MokaResultStore::new(config.policy.clone()))),
            StoreBackend::Sled(path) => Ok(Arc::new(SledResultStore::open(
                path,
                config.policy.clone(),
                config.timeout,
            )?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay::{Clock, ExpiryPolicy, ManualClock};
    use serde_json::json;
    use shared::Error;
    use std::time::Duration;
    use tempfile::TempDir;

    const TTL: Duration = Duration::from_secs(300);

    /// Every backend, each with its own clock; the temp dir keeps sled alive
    fn all_backends() -> Vec<(Arc<dyn ResultStore>, Arc<ManualClock>, Option<TempDir>)> {
        let mut stores = Vec::new();

        let clock = Arc::new(ManualClock::new(1_000_000));
        let config = StoreConfig::new(
            StoreBackend::Memory,
            ExpiryPolicy::new(TTL, clock.clone()),
            Duration::from_secs(5),
        );
        stores.push((
            UnifiedStorageFactory.create_from_config(&config).unwrap(),
            clock,
            None,
        ));

        let temp_dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::new(1_000_000));
        let config = StoreConfig::new(
            StoreBackend::Sled(temp_dir.path().join("results.sled")),
            ExpiryPolicy::new(TTL, clock.clone()),
            Duration::from_secs(5),
        );
        stores.push((
            UnifiedStorageFactory.create_from_config(&config).unwrap(),
            clock,
            Some(temp_dir),
        ));

        stores
    }

    #[tokio::test]
    async fn test_factory_selects_backend() {
        let backends: Vec<&str> = all_backends()
            .iter()
            .map(|(store, _, _)| store.backend())
            .collect();
        assert_eq!(backends, vec!["memory", "sled"]);
    }

    #[tokio::test]
    async fn test_round_trip() {
        for (store, _clock, _dir) in all_backends() {
            let payload = json!({"msg": "ok", "items": [1, 2, 3], "nested": {"flag": true}});
            store.put("req-1", "complete", payload.clone()).await.unwrap();

            let record = store.get("req-1").await.unwrap().unwrap();
            assert_eq!(record.status, "complete", "{}", store.backend());
            assert_eq!(record.payload, payload, "{}", store.backend());
        }
    }

    #[tokio::test]
    async fn test_expiry_boundary() {
        for (store, clock, _dir) in all_backends() {
            store.put("req-2", "complete", json!({})).await.unwrap();

            clock.advance(TTL - Duration::from_millis(1));
            assert!(store.get("req-2").await.unwrap().is_some(), "{}", store.backend());

            clock.advance(Duration::from_millis(1));
            assert!(store.get("req-2").await.unwrap().is_none(), "{}", store.backend());
        }
    }

    #[tokio::test]
    async fn test_overwrite_resets_timestamp() {
        for (store, clock, _dir) in all_backends() {
            store.put("req-3", "processing", json!({"step": 1})).await.unwrap();
            clock.advance(Duration::from_secs(200));
            store.put("req-3", "complete", json!({"step": 2})).await.unwrap();

            let record = store.get("req-3").await.unwrap().unwrap();
            assert_eq!(record.status, "complete");
            assert_eq!(record.payload, json!({"step": 2}));
            assert_eq!(record.stored_at_ms, clock.now_ms());

            // Past the first write's TTL but not the second's
            clock.advance(Duration::from_secs(200));
            assert!(store.get("req-3").await.unwrap().is_some(), "{}", store.backend());
        }
    }

    #[tokio::test]
    async fn test_miss_is_not_an_error() {
        for (store, _clock, _dir) in all_backends() {
            assert!(store.get("unknown-id").await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired() {
        for (store, clock, _dir) in all_backends() {
            store.put("old-1", "complete", json!({})).await.unwrap();
            store.put("old-2", "error", json!({})).await.unwrap();
            clock.advance(Duration::from_secs(250));
            store.put("young", "complete", json!({})).await.unwrap();
            clock.advance(Duration::from_secs(50));

            assert_eq!(store.sweep().await.unwrap(), 2, "{}", store.backend());
            assert_eq!(store.sweep().await.unwrap(), 0, "{}", store.backend());
            assert_eq!(store.entry_count().await.unwrap(), 1, "{}", store.backend());
            assert!(store.get("young").await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn test_empty_key_or_status_is_rejected() {
        for (store, _clock, _dir) in all_backends() {
            assert!(matches!(
                store.put("", "complete", json!({})).await,
                Err(Error::MissingField("key"))
            ));
            assert!(matches!(
                store.put("req-4", "", json!({})).await,
                Err(Error::MissingField("status"))
            ));
            assert!(matches!(
                store.get("").await,
                Err(Error::MissingField("key"))
            ));
            assert!(store.get("req-4").await.unwrap().is_none());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_and_readers() {
        for (store, _clock, _dir) in all_backends() {
            let mut handles = Vec::new();

            for i in 0..16 {
                let store = store.clone();
                handles.push(tokio::spawn(async move {
                    let key = format!("req-{}", i % 4);
                    store
                        .put(&key, "complete", json!({"writer": i}))
                        .await
                        .unwrap();
                    let record = store.get(&key).await.unwrap().unwrap();
                    // Whole records only: payload always matches some writer
                    assert_eq!(record.status, "complete");
                    assert!(record.payload["writer"].is_u64());
                }));
            }

            for handle in handles {
                handle.await.unwrap();
            }

            assert_eq!(store.entry_count().await.unwrap(), 4, "{}", store.backend());
        }
    }
}
