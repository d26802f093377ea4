use crate::models::ErrorResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shared::Error;

/// Error returned by handlers, rendered as `{"error": ...}` JSON
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse::new(message),
        }
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.body.usage = Some(usage.into());
        self
    }

    pub fn missing_body_field(field: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            format!("Missing {} in request body", field),
        )
    }

    pub fn missing_query_param(name: &str, usage: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, format!("Missing {} parameter", name)).with_usage(usage)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::MissingField(field) => Self::missing_body_field(field),
            Error::Forbidden => Self::new(StatusCode::FORBIDDEN, "Forbidden - Invalid secret"),
            Error::Storage(msg) => {
                tracing::error!("Result store failure: {}", msg);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Result store unavailable")
            }
            Error::Upstream(msg) => Self::new(StatusCode::BAD_GATEWAY, msg),
            Error::Config(msg) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            ApiError::from(Error::MissingField("status")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::from(Error::Forbidden).status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::from(Error::Storage("disk gone".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(Error::Upstream("refused".into())).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_missing_query_param_carries_usage() {
        let err = ApiError::missing_query_param("session_id", "/status?session_id=xxx");
        assert_eq!(err.body.error, "Missing session_id parameter");
        assert_eq!(err.body.usage.as_deref(), Some("/status?session_id=xxx"));
    }
}
