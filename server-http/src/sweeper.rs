use relay::ResultStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Periodically sweep expired results, on top of the sweep every write does
pub fn spawn_sweeper(results: Arc<dyn ResultStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match results.sweep().await {
                Ok(0) => debug!("Periodic sweep found nothing to remove"),
                Ok(removed) => info!("Periodic sweep removed {} expired result(s)", removed),
                Err(e) => warn!("Periodic sweep failed: {}", e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use relay::ResultRecord;
    use serde_json::Value;
    use shared::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingStore {
        sweeps: AtomicUsize,
    }

    #[async_trait]
    impl ResultStore for CountingStore {
        async fn put(&self, _key: &str, _status: &str, _payload: Value) -> Result<()> {
            Ok(())
        }

        async fn get(&self, _key: &str) -> Result<Option<ResultRecord>> {
            Ok(None)
        }

        async fn sweep(&self) -> Result<usize> {
            self.sweeps.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }

        async fn entry_count(&self) -> Result<u64> {
            Ok(0)
        }

        fn backend(&self) -> &'static str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_sweeper_runs_periodically() {
        let store = Arc::new(CountingStore::default());
        let handle = spawn_sweeper(store.clone(), Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        assert!(store.sweeps.load(Ordering::SeqCst) >= 2);
    }
}
