use crate::clock::{Clock, SystemClock};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::config::{Config, StoreBackend};
use shared::{Error, Result};
use std::sync::Arc;
use std::time::Duration;

/// Prefix applied to keys in backends that may hold unrelated data
pub const KEY_PREFIX: &str = "result:";

pub fn namespaced_key(key: &str) -> String {
    format!("{}{}", KEY_PREFIX, key)
}

/// Completed workflow result, keyed by the caller's session identifier
#[derive(Clone, Debug, PartialEq)]
pub struct ResultRecord {
    pub key: String,
    pub status: String,
    pub payload: Value,
    pub stored_at_ms: u64, // ms since epoch
}

impl ResultRecord {
    pub fn new(
        key: impl Into<String>,
        status: impl Into<String>,
        payload: Value,
        stored_at_ms: u64,
    ) -> Self {
        Self {
            key: key.into(),
            status: status.into(),
            payload,
            stored_at_ms,
        }
    }

    /// Age at `now_ms`; a clock that went backwards reads as age zero
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.stored_at_ms)
    }

    pub fn to_stored(&self) -> StoredResult {
        StoredResult {
            status: self.status.clone(),
            data: self.payload.clone(),
            timestamp: self.stored_at_ms,
        }
    }

    pub fn from_stored(key: impl Into<String>, stored: StoredResult) -> Self {
        Self::new(key, stored.status, stored.data, stored.timestamp)
    }
}

/// External representation of a record in a persistent backend
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    pub status: String,
    pub data: Value,
    pub timestamp: u64,
}

pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::MissingField("key"));
    }
    Ok(())
}

pub fn validate_status(status: &str) -> Result<()> {
    if status.is_empty() {
        return Err(Error::MissingField("status"));
    }
    Ok(())
}

/// Fixed TTL plus the clock it is measured against
#[derive(Clone)]
pub struct ExpiryPolicy {
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ExpiryPolicy {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { ttl, clock }
    }

    pub fn with_system_clock(ttl: Duration) -> Self {
        Self::new(ttl, Arc::new(SystemClock))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl.as_millis() as u64
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn is_expired(&self, record: &ResultRecord) -> bool {
        self.is_expired_at(record, self.now_ms())
    }

    pub fn is_expired_at(&self, record: &ResultRecord, now_ms: u64) -> bool {
        self.is_timestamp_expired(record.stored_at_ms, now_ms)
    }

    pub fn is_timestamp_expired(&self, stored_at_ms: u64, now_ms: u64) -> bool {
        now_ms.saturating_sub(stored_at_ms) >= self.ttl_ms()
    }
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self::with_system_clock(Self::DEFAULT_TTL)
    }
}

impl std::fmt::Debug for ExpiryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiryPolicy")
            .field("ttl", &self.ttl)
            .field("clock", &"<dyn Clock>")
            .finish()
    }
}

/// Everything a storage factory needs to build a result store
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub policy: ExpiryPolicy,
    pub timeout: Duration, // bound on each blocking backend call
}

impl StoreConfig {
    pub fn new(backend: StoreBackend, policy: ExpiryPolicy, timeout: Duration) -> Self {
        Self {
            backend,
            policy,
            timeout,
        }
    }

    pub fn from_config(config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            config.store.clone(),
            ExpiryPolicy::new(config.result_ttl, clock),
            config.store_timeout,
        )
    }
}
