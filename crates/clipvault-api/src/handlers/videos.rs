use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use clipvault_core::models::{NewVideo, VideoResponse};
use clipvault_core::AppError;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Name of the multipart field carrying the video payload.
const VIDEO_FIELD: &str = "video";

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVideoRequest {
    pub title: String,
    pub description: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/videos",
    tag = "videos",
    responses(
        (status = 200, description = "Draft video record created", body = VideoResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse)
    )
)]
pub async fn create_video(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(request): Json<CreateVideoRequest>,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let video = state
        .videos
        .create_video(NewVideo {
            id: Uuid::new_v4(),
            user_id: auth.user_id,
            title: request.title,
            description: request.description,
        })
        .await?;

    Ok(Json(VideoResponse::from(video)))
}

#[utoipa::path(
    get,
    path = "/api/videos/{video_id}",
    tag = "videos",
    params(
        ("video_id" = Uuid, Path, description = "Video identifier")
    ),
    responses(
        (status = 200, description = "Video record", body = VideoResponse),
        (status = 403, description = "Caller does not own this video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<Uuid>,
    auth: AuthUser,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let video = state
        .videos
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

    // Ownership mismatch is a 403, never masked as a 404.
    if video.user_id != auth.user_id {
        return Err(AppError::Forbidden("Not authorized to view this video".to_string()).into());
    }

    Ok(Json(VideoResponse::from(video)))
}

#[utoipa::path(
    post,
    path = "/api/videos/{video_id}",
    tag = "videos",
    params(
        ("video_id" = Uuid, Path, description = "Video identifier")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video ingested", body = VideoResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Caller does not own this video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "Payload too large", body = ErrorResponse),
        (status = 500, description = "Pipeline failure", body = ErrorResponse)
    )
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<Uuid>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<VideoResponse>, HttpAppError> {
    // Resolve the record and check ownership before reading the body: a
    // caller who cannot upload must not make the server buffer a payload,
    // and gets 403/404 even when the body is malformed. The pipeline
    // re-validates under its per-video lock.
    let video = state
        .videos
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

    if video.user_id != auth.user_id {
        return Err(
            AppError::Forbidden("Not authorized to upload this video".to_string()).into(),
        );
    }

    let mut payload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }

        let content_type = field
            .content_type()
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidInput("Video field has no content type".to_string()))?;

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read video field: {}", e)))?;

        payload = Some((content_type, data));
        break;
    }

    let (content_type, data) = payload
        .ok_or_else(|| AppError::InvalidInput(format!("Missing '{}' field", VIDEO_FIELD)))?;

    let video = state
        .ingest
        .ingest_video(video_id, auth.user_id, &content_type, data)
        .await?;

    Ok(Json(VideoResponse::from(video)))
}
