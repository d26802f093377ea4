use async_trait::async_trait;
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use relay::domain::{validate_key, validate_status};
use relay::{ExpiryPolicy, ResultRecord, ResultStore};
use serde_json::Value;
use shared::Result;
use std::fmt::Debug;
use tracing::{debug, warn};

/// Moka-based in-memory result store.
///
/// Moka's own `time_to_live` is set to the policy TTL so entries are
/// physically dropped even if nobody sweeps; the policy clock decides
/// what `get` and `sweep` consider expired.
pub struct MokaResultStore {
    cache: Cache<String, ResultRecord>,
    policy: ExpiryPolicy,
}

impl MokaResultStore {
    pub fn new(policy: ExpiryPolicy) -> Self {
        let cache = Cache::builder()
            .name("results")
            .time_to_live(policy.ttl())
            .build();

        Self { cache, policy }
    }

    /// Remove `key` only if the record currently stored is still expired,
    /// so a concurrent overwrite survives.
    async fn evict_if_expired(&self, key: String) -> bool {
        let policy = &self.policy;
        let result = self
            .cache
            .entry(key)
            .and_compute_with(|entry| {
                let op = match entry {
                    Some(entry) if policy.is_expired(entry.value()) => Op::Remove,
                    _ => Op::Nop,
                };
                std::future::ready(op)
            })
            .await;

        matches!(result, CompResult::Removed(_))
    }
}

#[async_trait]
impl ResultStore for MokaResultStore {
    async fn put(&self, key: &str, status: &str, payload: Value) -> Result<()> {
        validate_key(key)?;
        validate_status(status)?;

        let record = ResultRecord::new(key, status, payload, self.policy.now_ms());
        self.cache.insert(key.to_string(), record).await;
        debug!("Stored result for session: {}, status: {}", key, status);

        match self.sweep().await {
            Ok(0) => {}
            Ok(removed) => debug!("Swept {} expired result(s) after write", removed),
            Err(e) => warn!("Sweep after write failed: {}", e),
        }

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<ResultRecord>> {
        validate_key(key)?;

        match self.cache.get(key).await {
            Some(record) if self.policy.is_expired(&record) => {
                if self.evict_if_expired(key.to_string()).await {
                    debug!("Evicted expired result for session: {}", key);
                }
                Ok(None)
            }
            Some(record) => Ok(Some(record)),
            None => Ok(None),
        }
    }

    async fn sweep(&self) -> Result<usize> {
        let now = self.policy.now_ms();
        let expired: Vec<String> = self
            .cache
            .iter()
            .filter(|(_, record)| self.policy.is_expired_at(record, now))
            .map(|(key, _)| (*key).clone())
            .collect();

        let mut removed = 0;
        for key in expired {
            if self.evict_if_expired(key.clone()).await {
                debug!("Cleaned up expired result for session: {}", key);
                removed += 1;
            }
        }

        Ok(removed)
    }

    async fn entry_count(&self) -> Result<u64> {
        self.cache.run_pending_tasks().await;
        Ok(self.cache.entry_count())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

impl Debug for MokaResultStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaResultStore")
            .field("entry_count", &self.cache.entry_count())
            .field("policy", &self.policy)
            .finish()
    }
}
