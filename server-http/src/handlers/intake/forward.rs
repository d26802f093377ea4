use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use shared::Error;
use tracing::info;

const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// POST /api/intake
///
/// Relays the submission to the workflow engine untouched and hands its
/// response back as-is.
pub async fn forward_intake(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let Some(url) = state.config.intake_webhook_url.as_deref() else {
        return Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Missing N8N_WEBHOOK_URL env var",
        ));
    };

    let body = if body.is_empty() {
        Bytes::from_static(b"{}")
    } else {
        body
    };

    let upstream = state
        .http_client
        .post(url)
        .header(reqwest::header::CONTENT_TYPE, DEFAULT_CONTENT_TYPE)
        .body(body)
        .send()
        .await
        .map_err(|e| Error::Upstream(format!("Failed to reach workflow engine: {}", e)))?;

    let status = StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = upstream
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string();
    let payload = upstream
        .bytes()
        .await
        .map_err(|e| Error::Upstream(format!("Failed to read workflow engine response: {}", e)))?;

    info!("Forwarded intake submission, upstream status: {}", status);

    Ok((status, [(header::CONTENT_TYPE, content_type)], payload).into_response())
}
