use crate::routes::build_app;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::Request,
    response::Response,
};
use relay::{ExpiryPolicy, ManualClock, ResultRecord, ResultStore};
use serde_json::Value;
use shared::config::Config;
use shared::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use storage_engine::MokaResultStore;
use tower::ServiceExt;

fn config_from(vars: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|name| vars.get(name).cloned()).unwrap()
}

/// State backed by an isolated in-memory store on a manual clock
pub(crate) fn test_state(vars: &[(&str, &str)]) -> (AppState, Arc<ManualClock>) {
    let config = config_from(vars);

    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let results = Arc::new(MokaResultStore::new(ExpiryPolicy::new(
        config.result_ttl,
        clock.clone(),
    )));

    (AppState::new(Arc::new(config), results).unwrap(), clock)
}

pub(crate) async fn send(state: AppState, request: Request<Body>) -> Response {
    build_app(state).oneshot(request).await.unwrap()
}

pub(crate) async fn json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Store whose backend is always down
pub(crate) struct FailingStore;

#[async_trait]
impl ResultStore for FailingStore {
    async fn put(&self, _key: &str, _status: &str, _payload: Value) -> Result<()> {
        Err(Error::Storage("put timed out after 1ms".into()))
    }

    async fn get(&self, _key: &str) -> Result<Option<ResultRecord>> {
        Err(Error::Storage("get timed out after 1ms".into()))
    }

    async fn sweep(&self) -> Result<usize> {
        Err(Error::Storage("sweep timed out after 1ms".into()))
    }

    async fn entry_count(&self) -> Result<u64> {
        Err(Error::Storage("count timed out after 1ms".into()))
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}

pub(crate) fn failing_state() -> AppState {
    AppState::new(Arc::new(config_from(&[])), Arc::new(FailingStore)).unwrap()
}
