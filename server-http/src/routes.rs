use crate::handlers;
use crate::middleware::{CALLBACK_SECRET_HEADER, require_callback_secret};
use crate::state::AppState;
use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use shared::config::Config;
use tower_http::cors::{Any, CorsLayer};
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::TraceLayer;

/// Router wrapped so trailing slashes are trimmed before routing
pub fn build_app(state: AppState) -> NormalizePath<Router> {
    NormalizePath::trim_trailing_slash(build_router(state))
}

/// Build and configure the application router
pub fn build_router(state: AppState) -> Router {
    // Only the completion callback is behind the shared secret
    let callback_routes = Router::new()
        .route("/api/intake/complete", post(handlers::receive_completion))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_callback_secret,
        ));

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Intake relay and result polling
        .route("/api/intake", post(handlers::forward_intake))
        .route("/api/intake/status", get(handlers::poll_status))
        .merge(callback_routes)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        // Middleware
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(CALLBACK_SECRET_HEADER),
        ]);

    if config.allows_any_origin() {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid allowed origin: {}", origin);
                    None
                }
            })
            .collect();
        layer.allow_origin(origins)
    }
}
