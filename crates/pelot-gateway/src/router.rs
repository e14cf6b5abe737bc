use axum::Router;
use axum::routing::{get, post};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{ask_handler, health_handler, index_handler, ingest_handler};
use crate::server::AppState;

pub(crate) fn build_router(state: AppState, max_body_size: usize) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/api/ask", post(ask_handler))
        .route("/api/ingest", post(ingest_handler))
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
