use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::Error;
use subtle::ConstantTimeEq;
use tracing::error;

/// Header the workflow engine sends the shared secret in
pub const CALLBACK_SECRET_HEADER: &str = "x-callback-secret";

/// Compare two secrets in constant time
fn secrets_match(supplied: &str, expected: &str) -> bool {
    let supplied = supplied.as_bytes();
    let expected = expected.as_bytes();

    if supplied.len() == expected.len() {
        supplied.ct_eq(expected).into()
    } else {
        // Keep timing independent of where the mismatch is
        let _ = expected.ct_eq(expected);
        false
    }
}

/// Reject callbacks whose secret header does not match the configured secret.
/// With no secret configured every callback is let through.
pub async fn require_callback_secret(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(expected) = state.config.callback_secret.as_deref() {
        let supplied = request
            .headers()
            .get(CALLBACK_SECRET_HEADER)
            .and_then(|h| h.to_str().ok());

        if !supplied.is_some_and(|s| secrets_match(s, expected)) {
            error!("Invalid callback secret received");
            return Err(Error::Forbidden.into());
        }
    }

    Ok(next.run(request).await)
}
