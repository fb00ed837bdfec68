//! Route configuration and setup

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::state::AppState;

// Headroom for multipart framing on top of the payload ceiling.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Build the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_video_size_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/api-doc/openapi.json", get(openapi_json))
        .route("/api/videos", post(handlers::videos::create_video))
        .route(
            "/api/videos/{video_id}",
            post(handlers::videos::upload_video).get(handlers::videos::get_video),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
