use crate::error::ApiError;
use crate::models::{CompletionCallback, CompletionResponse};
use crate::state::AppState;
use axum::{Json, body::Bytes, extract::State};
use tracing::{Level, debug, info, warn};

/// POST /api/intake/complete
///
/// Completion callback from the workflow engine. The shared secret has
/// already been checked by `require_callback_secret`.
pub async fn receive_completion(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CompletionResponse>, ApiError> {
    let callback = CompletionCallback::from_body(&body);

    let session_id = callback
        .session_id
        .ok_or_else(|| ApiError::missing_body_field("session_id"))?;
    let status = callback
        .status
        .ok_or_else(|| ApiError::missing_body_field("status"))?;

    info!(
        "Received completion callback for session: {}, status: {}",
        session_id, status
    );

    state.results.put(&session_id, &status, callback.data).await?;

    info!("Cached result for session: {}", session_id);

    // Counting is a full scan on sled
    if tracing::enabled!(Level::DEBUG) {
        match state.results.entry_count().await {
            Ok(size) => debug!("Cache size: {}", size),
            Err(e) => warn!("Cache size unavailable: {}", e),
        }
    }

    Ok(Json(CompletionResponse {
        received: true,
        session_id,
        cached: true,
    }))
}
