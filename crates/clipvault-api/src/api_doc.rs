//! OpenAPI document for the HTTP surface.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::videos::create_video,
        crate::handlers::videos::get_video,
        crate::handlers::videos::upload_video,
    ),
    components(schemas(
        clipvault_core::models::VideoResponse,
        crate::handlers::videos::CreateVideoRequest,
        crate::error::ErrorResponse,
    )),
    tags(
        (name = "videos", description = "Video ingest and metadata")
    )
)]
pub struct ApiDoc;
