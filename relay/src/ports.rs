use crate::domain::{ResultRecord, StoreConfig};
use async_trait::async_trait;
use serde_json::Value;
use shared::Result;
use std::sync::Arc;

// Ports are the pluggable extension points for result storage backends

/// Port for creating a result store from configuration
pub trait StorageFactory: Send + Sync + 'static {
    fn create_from_config(&self, config: &StoreConfig) -> Result<Arc<dyn ResultStore>>;
}

/// Short-lived result cache keyed by session identifier.
///
/// Expired records behave exactly like absent ones. Every implementation
/// must be safe to share across concurrent request handlers.
#[async_trait]
pub trait ResultStore: Send + Sync + 'static {
    /// Insert or replace the record for `key`, stamped with the current time.
    /// Runs a sweep of expired records afterwards.
    async fn put(&self, key: &str, status: &str, payload: Value) -> Result<()>;

    /// Live record for `key`, or `None` when absent, expired or unreadable
    async fn get(&self, key: &str) -> Result<Option<ResultRecord>>;

    /// Remove every expired record and return how many were removed
    async fn sweep(&self) -> Result<usize>;

    /// Number of stored entries, expired ones included until swept
    async fn entry_count(&self) -> Result<u64>;

    fn backend(&self) -> &'static str;
}
