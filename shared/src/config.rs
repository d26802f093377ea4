use crate::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Backing store selected for the result cache
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Sled(PathBuf), // database directory
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub http_port: u16,
    pub allowed_origins: Vec<String>,
    pub callback_secret: Option<String>,
    pub intake_webhook_url: Option<String>,
    pub result_ttl: Duration,
    pub store: StoreBackend,
    pub store_timeout: Duration,
    pub sweep_interval: Option<Duration>, // None = on-write sweep only
    pub forward_timeout: Duration,
}

impl Config {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_HTTP_PORT: u16 = 8080;
    const DEFAULT_DATA_DIR: &'static str = "./data";
    const DEFAULT_RESULT_TTL_SECS: u64 = 300;
    const MAX_RESULT_TTL_SECS: u64 = 365 * 24 * 60 * 60;
    const DEFAULT_STORE_TIMEOUT_MS: u64 = 2_000;
    const DEFAULT_FORWARD_TIMEOUT_MS: u64 = 30_000;

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset, the same as an absent variable
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let number = |name: &str, default: u64| {
            var(name)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };

        let http_port = var("RELAY_HTTP_PORT")
            .and_then(|v| v.trim().parse::<u16>().ok())
            .unwrap_or(Self::DEFAULT_HTTP_PORT);

        let data_dir = var("RELAY_DATA_DIR").unwrap_or_else(|| Self::DEFAULT_DATA_DIR.to_string());
        let store = match var("RELAY_STORE_BACKEND")
            .map(|v| v.trim().to_lowercase())
            .as_deref()
        {
            None | Some("memory") => StoreBackend::Memory,
            Some("sled") => StoreBackend::Sled(PathBuf::from(data_dir).join("results.sled")),
            Some(other) => {
                return Err(Error::Config(format!(
                    "unknown store backend '{}', expected 'memory' or 'sled'",
                    other
                )));
            }
        };

        let callback_secret = var("CALLBACK_SECRET");
        if callback_secret.is_none() {
            warn!("CALLBACK_SECRET not set, completion callbacks are accepted without a secret");
        }

        let result_ttl_secs = number("RELAY_RESULT_TTL_SECS", Self::DEFAULT_RESULT_TTL_SECS);
        if result_ttl_secs > Self::MAX_RESULT_TTL_SECS {
            return Err(Error::Config(format!(
                "result TTL of {}s exceeds the maximum of {}s",
                result_ttl_secs,
                Self::MAX_RESULT_TTL_SECS
            )));
        }

        let sweep_interval = match number("RELAY_SWEEP_INTERVAL_SECS", 0) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Self {
            host: var("RELAY_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string()),
            http_port,
            allowed_origins: var("RELAY_ALLOWED_ORIGINS")
                .unwrap_or_else(|| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            callback_secret,
            intake_webhook_url: var("N8N_WEBHOOK_URL"),
            result_ttl: Duration::from_secs(result_ttl_secs),
            store,
            store_timeout: Duration::from_millis(number(
                "RELAY_STORE_TIMEOUT_MS",
                Self::DEFAULT_STORE_TIMEOUT_MS,
            )),
            sweep_interval,
            forward_timeout: Duration::from_millis(number(
                "RELAY_FORWARD_TIMEOUT_MS",
                Self::DEFAULT_FORWARD_TIMEOUT_MS,
            )),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}
