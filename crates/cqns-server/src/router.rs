use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router: service endpoints plus the namespace interceptor
/// on every other path.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .route("/*path", get(handler::namespace_handler))
        .fallback(handler::fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
