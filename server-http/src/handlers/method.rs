use crate::error::ApiError;
use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};

/// Known path, unsupported method. Bare `OPTIONS` is always answered with 200.
pub async fn method_not_allowed(method: Method) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response()
}
