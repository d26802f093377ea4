use crate::error::ApiError;
use crate::models::{STATUS_USAGE, StatusQuery, StatusResponse};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Query, State},
};
use tracing::{debug, info};

/// GET /api/intake/status?session_id=...
///
/// A miss is not an error: the client keeps polling until the result lands.
pub async fn poll_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<StatusResponse>, ApiError> {
    let session_id = query
        .session_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::missing_query_param("session_id", STATUS_USAGE))?;

    match state.results.get(&session_id).await? {
        Some(record) => {
            info!(
                "Cache hit for session: {}, status: {}",
                session_id, record.status
            );
            Ok(Json(StatusResponse::from_record(record)))
        }
        None => {
            debug!("Cache miss for session: {} - still processing", session_id);
            Ok(Json(StatusResponse::processing()))
        }
    }
}
