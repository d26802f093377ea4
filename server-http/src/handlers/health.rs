use crate::error::ApiError;
use crate::models::HealthResponse;
use crate::state::AppState;
use axum::{Json, extract::State};

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let entries = state.results.entry_count().await?;

    Ok(Json(HealthResponse {
        message: "OK".into(),
        backend: state.results.backend().into(),
        entries,
    }))
}
