use relay::{ResultStore, StorageFactory, StoreConfig, SystemClock};
use shared::config::Config;
use shared::{Error, Result};
use std::sync::Arc;
use storage_engine::UnifiedStorageFactory;

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub results: Arc<dyn ResultStore>,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(config: Arc<Config>, results: Arc<dyn ResultStore>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.forward_timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            results,
            http_client,
        })
    }

    /// Build the configured result store and wrap it in server state
    pub fn from_config(config: Arc<Config>) -> Result<Self> {
        let store_config = StoreConfig::from_config(&config, Arc::new(SystemClock));
        let results = UnifiedStorageFactory.create_from_config(&store_config)?;

        tracing::info!(
            "Result store initialized: backend={}, ttl={}s",
            results.backend(),
            config.result_ttl.as_secs()
        );

        Self::new(config, results)
    }
}
