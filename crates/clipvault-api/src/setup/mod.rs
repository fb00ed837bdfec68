//! Application wiring: database, storage, pipeline and routes.

pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use clipvault_core::Config;
use clipvault_db::{PgVideoRepository, VideoRepository};
use clipvault_processing::{FfmpegTranscoder, FfprobeProber, Prober, Transcoder};
use clipvault_storage::{S3Storage, Storage};

use crate::services::ingest::IngestPipeline;
use crate::state::AppState;

/// Initialize the application: connect to the database, run migrations,
/// build the storage adapter and the ingest pipeline, and assemble routes.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router)> {
    let pool = clipvault_db::connect(&config.database_url).await?;
    clipvault_db::run_migrations(&pool).await?;

    let videos: Arc<dyn VideoRepository> = Arc::new(PgVideoRepository::new(pool));

    let storage: Arc<dyn Storage> = Arc::new(S3Storage::new(
        config.s3_bucket.clone(),
        config.s3_region.clone(),
        config.s3_endpoint.clone(),
    )?);

    let prober: Arc<dyn Prober> = Arc::new(FfprobeProber::new(config.ffprobe_path.clone()));
    let transcoder: Arc<dyn Transcoder> =
        Arc::new(FfmpegTranscoder::new(config.ffmpeg_path.clone()));

    let ingest = IngestPipeline::new(
        config.clone(),
        videos.clone(),
        storage,
        prober,
        transcoder,
    );

    let state = Arc::new(AppState {
        config,
        videos,
        ingest,
    });

    let router = routes::build_router(state.clone());

    Ok((state, router))
}
