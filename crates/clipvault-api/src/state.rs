//! Shared application state.

use std::sync::Arc;

use clipvault_core::Config;
use clipvault_db::VideoRepository;

use crate::services::ingest::IngestPipeline;

pub struct AppState {
    pub config: Config,
    pub videos: Arc<dyn VideoRepository>,
    pub ingest: IngestPipeline,
}
