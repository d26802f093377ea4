use async_trait::async_trait;
use relay::domain::{KEY_PREFIX, namespaced_key, validate_key, validate_status};
use relay::{ExpiryPolicy, ResultRecord, ResultStore, StoredResult};
use serde_json::Value;
use shared::{Error, Result};
use sled::{Db, IVec};
use std::fmt::Debug;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Sled-backed result store.
///
/// Records are kept as JSON `{"status", "data", "timestamp"}` under
/// `result:<key>`, so the database can be shared with other data.
#[derive(Clone)]
pub struct SledResultStore {
    db: Db,
    policy: ExpiryPolicy,
    timeout: Duration,
}

fn storage_error(context: &str, e: impl std::fmt::Display) -> Error {
    Error::Storage(format!("{}: {}", context, e))
}

/// Decode a stored record, logging and discarding anything unreadable
fn decode(key: &str, bytes: &[u8]) -> Option<ResultRecord> {
    match serde_json::from_slice::<StoredResult>(bytes) {
        Ok(stored) => Some(ResultRecord::from_stored(key, stored)),
        Err(e) => {
            warn!("Malformed cached result for session: {} ({})", key, e);
            None
        }
    }
}

/// Delete `key` only if it still holds `expected`
fn remove_if_unchanged(db: &Db, key: &[u8], expected: &[u8]) -> Result<bool> {
    let swapped = db
        .compare_and_swap(key, Some(expected), None::<&[u8]>)
        .map_err(|e| storage_error("Failed to remove result", e))?;
    Ok(swapped.is_ok())
}

impl SledResultStore {
    /// Open (or create) the database at `path`
    /// Creates the parent directory if it doesn't exist
    pub fn open(path: impl AsRef<Path>, policy: ExpiryPolicy, timeout: Duration) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| storage_error("Failed to create directory", e))?;
        }

        let db = sled::open(path).map_err(|e| storage_error("Failed to open Sled database", e))?;
        info!("Opened sled result store");

        Ok(Self::with_db(db, policy, timeout))
    }

    pub fn with_db(db: Db, policy: ExpiryPolicy, timeout: Duration) -> Self {
        Self {
            db,
            policy,
            timeout,
        }
    }

    /// Run a blocking sled operation off the async runtime, bounded by the timeout
    async fn blocking<T, F>(&self, op: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(Db) -> Result<T> + Send + 'static,
    {
        let db = self.db.clone();
        let task = tokio::task::spawn_blocking(move || f(db));

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(storage_error(op, e)),
            Err(_) => Err(Error::Storage(format!(
                "{} timed out after {}ms",
                op,
                self.timeout.as_millis()
            ))),
        }
    }
}

#[async_trait]
impl ResultStore for SledResultStore {
    async fn put(&self, key: &str, status: &str, payload: Value) -> Result<()> {
        validate_key(key)?;
        validate_status(status)?;

        let record = ResultRecord::new(key, status, payload, self.policy.now_ms());
        let bytes = serde_json::to_vec(&record.to_stored())
            .map_err(|e| storage_error("Failed to serialize result", e))?;
        let storage_key = namespaced_key(key);

        self.blocking("put", move |db| {
            db.insert(storage_key.as_bytes(), bytes)
                .map_err(|e| storage_error("Failed to save result", e))?;
            Ok(())
        })
        .await?;
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

        let storage_key = namespaced_key(key);
        let lookup_key = storage_key.clone();
        let raw: Option<IVec> = self
            .blocking("get", move |db| {
                db.get(lookup_key.as_bytes())
                    .map_err(|e| storage_error("Failed to get result", e))
            })
            .await?;

        let Some(raw) = raw else {
            return Ok(None);
        };
        let Some(record) = decode(key, &raw) else {
            return Ok(None);
        };

        if self.policy.is_expired(&record) {
            let evicted = self
                .blocking("evict", move |db| {
                    remove_if_unchanged(&db, storage_key.as_bytes(), &raw)
                })
                .await;
            match evicted {
                Ok(true) => debug!("Evicted expired result for session: {}", key),
                Ok(false) => {}
                Err(e) => warn!("Failed to evict expired result for session {}: {}", key, e),
            }
            return Ok(None);
        }

        Ok(Some(record))
    }

    async fn sweep(&self) -> Result<usize> {
        let policy = self.policy.clone();

        self.blocking("sweep", move |db| {
            let now = policy.now_ms();
            let mut removed = 0;

            for item in db.scan_prefix(KEY_PREFIX) {
                let (storage_key, raw) =
                    item.map_err(|e| storage_error("Failed to iterate results", e))?;
                let key = String::from_utf8_lossy(&storage_key[KEY_PREFIX.len()..]).into_owned();

                // Unreadable records can never be served, so they go too
                let stale = match decode(&key, &raw) {
                    Some(record) => policy.is_expired_at(&record, now),
                    None => true,
                };

                if stale && remove_if_unchanged(&db, &storage_key, &raw)? {
                    debug!("Cleaned up expired result for session: {}", key);
                    removed += 1;
                }
            }

            Ok(removed)
        })
        .await
    }

    async fn entry_count(&self) -> Result<u64> {
        self.blocking("count", |db| Ok(db.scan_prefix(KEY_PREFIX).count() as u64))
            .await
    }

    fn backend(&self) -> &'static str {
        "sled"
    }
}

impl Debug for SledResultStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledResultStore")
            .field("policy", &self.policy)
            .field("timeout", &self.timeout)
            .finish()
    }
}
